//! Replies attached to a thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ReplyId, ThreadId, UserId};

/// A reply. `is_answer` is flipped independently per reply; nothing limits a
/// thread to a single answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
  pub id:          ReplyId,
  pub thread_id:   ThreadId,
  pub content:     String,
  pub author_id:   UserId,
  pub author_name: String,
  pub created_at:  DateTime<Utc>,
  pub is_answer:   bool,
}

/// Input for [`ReplyRepository::insert_reply`](crate::store::ReplyRepository::insert_reply).
///
/// There is no `is_answer` field: a freshly authored reply is never the answer.
#[derive(Debug, Clone)]
pub struct NewReply {
  pub thread_id:   ThreadId,
  pub content:     String,
  pub author_id:   UserId,
  pub author_name: String,
}
