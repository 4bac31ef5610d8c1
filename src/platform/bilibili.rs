//! Bilibili web API client: blocking HTTP over ureq.
//!
//! Authenticates with the login cookies from the config and uses `bili_jct`
//! as the CSRF token for write calls. Credential refresh is not handled:
//! expired cookies surface as rejected actions.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::CommentService;
use crate::comment::{Comment, CommentId, UserId};
use crate::config::Credential;
use crate::constants::{COMMENT_PAGE_SIZE, HTTP_TIMEOUT_SECS, REPLY_PAGE_SIZE};
use crate::error::{WardenError, WardenResult};

const API_BASE: &str = "https://api.bilibili.com";
const REFERER: &str = "https://www.bilibili.com/";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Comment area type for videos.
const RESOURCE_TYPE_VIDEO: &str = "1";
/// Order by like count.
const SORT_BY_LIKE: &str = "2";
/// `x/relation/modify` action: add to blacklist.
const RELATION_ACT_BLOCK: &str = "5";
const RELATION_SOURCE: &str = "11";

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn failure(&self) -> Option<String> {
        (self.code != 0).then(|| format!("code {}: {}", self.code, self.message))
    }
}

#[derive(Debug, Deserialize)]
struct VideoView {
    aid: u64,
}

#[derive(Debug, Default, Deserialize)]
struct ReplyPage {
    #[serde(default)]
    replies: Option<Vec<Reply>>,
}

#[derive(Debug, Deserialize)]
struct Reply {
    rpid: u64,
    mid: u64,
    #[serde(default)]
    rcount: u32,
    #[serde(default)]
    member: Member,
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
struct Member {
    #[serde(default)]
    uname: String,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    message: String,
}

impl Reply {
    fn into_comment(self, page: u32, parent: Option<CommentId>) -> Comment {
        Comment {
            id: CommentId(self.rpid),
            author_id: UserId(self.mid),
            author_name: self.member.uname,
            text: self.content.message,
            page,
            parent,
            reply_count: if parent.is_some() { 0 } else { self.rcount },
        }
    }
}

fn page_into_comments(page_data: Option<ReplyPage>, page: u32, parent: Option<CommentId>) -> Vec<Comment> {
    page_data
        .and_then(|p| p.replies)
        .unwrap_or_default()
        .into_iter()
        .map(|r| r.into_comment(page, parent))
        .collect()
}

fn cookie_header(credential: &Credential) -> String {
    let mut cookie = format!("SESSDATA={}; bili_jct={}", credential.sessdata, credential.bili_jct);
    if !credential.ac_time_value.is_empty() {
        cookie.push_str(&format!("; ac_time_value={}", credential.ac_time_value));
    }
    cookie
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct BilibiliClient {
    agent: ureq::Agent,
    credential: Credential,
    cookie: String,
    bvid: String,
    aid: u64,
}

impl BilibiliClient {
    /// Build the client and resolve the BVID to the numeric video id.
    pub fn connect(bvid: &str, credential: Credential) -> WardenResult<Self> {
        if !credential.is_complete() {
            return Err(WardenError::Config(
                "'sessdata' and 'bili_jct' are required to moderate comments".into(),
            ));
        }

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .build()
            .into();

        let mut client = Self {
            agent,
            cookie: cookie_header(&credential),
            credential,
            bvid: bvid.to_string(),
            aid: 0,
        };

        let view: VideoView = client
            .get_json("/x/web-interface/view", &[("bvid", bvid.to_string())])?
            .ok_or_else(|| WardenError::Transport(format!("no video data for {}", bvid)))?;
        client.aid = view.aid;
        tracing::info!(bvid = %client.bvid, aid = client.aid, "Resolved target video");
        Ok(client)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> WardenResult<Option<T>> {
        let mut request = self
            .agent
            .get(format!("{}{}", API_BASE, path))
            .header("Cookie", &self.cookie)
            .header("User-Agent", USER_AGENT)
            .header("Referer", REFERER);
        for (key, value) in query {
            request = request.query(*key, value);
        }

        let mut response = request.call()?;
        let body: ApiResponse<T> = response.body_mut().read_json()?;
        if let Some(failure) = body.failure() {
            return Err(WardenError::Transport(format!("GET {} failed, {}", path, failure)));
        }
        Ok(body.data)
    }

    fn post_form(&self, path: &str, form: &[(&str, String)]) -> WardenResult<()> {
        let mut fields: Vec<(&str, &str)> = form.iter().map(|(k, v)| (*k, v.as_str())).collect();
        fields.push(("csrf", self.credential.bili_jct.as_str()));

        let mut response = self
            .agent
            .post(format!("{}{}", API_BASE, path))
            .header("Cookie", &self.cookie)
            .header("User-Agent", USER_AGENT)
            .header("Referer", REFERER)
            .send_form(fields)?;
        let body: ApiResponse<serde_json::Value> = response.body_mut().read_json()?;
        match body.failure() {
            Some(failure) => Err(WardenError::Rejected(format!("POST {} refused, {}", path, failure))),
            None => Ok(()),
        }
    }
}

impl CommentService for BilibiliClient {
    fn page_size(&self) -> usize {
        COMMENT_PAGE_SIZE
    }

    fn reply_page_size(&self) -> usize {
        REPLY_PAGE_SIZE
    }

    fn fetch_comments(&self, page: u32) -> WardenResult<Vec<Comment>> {
        tracing::debug!(page, "Fetching comment page");
        let data: Option<ReplyPage> = self.get_json(
            "/x/v2/reply",
            &[
                ("oid", self.aid.to_string()),
                ("type", RESOURCE_TYPE_VIDEO.to_string()),
                ("sort", SORT_BY_LIKE.to_string()),
                ("pn", page.to_string()),
                ("ps", COMMENT_PAGE_SIZE.to_string()),
            ],
        )?;
        Ok(page_into_comments(data, page, None))
    }

    fn fetch_replies(&self, root: CommentId, page: u32) -> WardenResult<Vec<Comment>> {
        tracing::debug!(root = %root, page, "Fetching reply page");
        let data: Option<ReplyPage> = self.get_json(
            "/x/v2/reply/reply",
            &[
                ("oid", self.aid.to_string()),
                ("type", RESOURCE_TYPE_VIDEO.to_string()),
                ("root", root.to_string()),
                ("pn", page.to_string()),
                ("ps", REPLY_PAGE_SIZE.to_string()),
            ],
        )?;
        Ok(page_into_comments(data, page, Some(root)))
    }

    fn delete_comment(&self, comment_id: CommentId) -> WardenResult<()> {
        self.post_form(
            "/x/v2/reply/del",
            &[
                ("oid", self.aid.to_string()),
                ("type", RESOURCE_TYPE_VIDEO.to_string()),
                ("rpid", comment_id.to_string()),
            ],
        )
    }

    fn block_user(&self, user_id: UserId) -> WardenResult<()> {
        self.post_form(
            "/x/relation/modify",
            &[
                ("fid", user_id.to_string()),
                ("act", RELATION_ACT_BLOCK.to_string()),
                ("re_src", RELATION_SOURCE.to_string()),
            ],
        )
    }
}
