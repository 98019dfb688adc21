use std::fmt;

use chrono::{
  DateTime,
  Utc
};
use serde::{
  Deserialize,
  Serialize
};

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
  pub fn new(
    raw: impl Into<String>
  ) -> Self {
    Self(raw.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for TaskId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for TaskId {
  fn from(raw: &str) -> Self {
    Self(raw.to_string())
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
pub enum TaskStatus {
  #[default]
  #[serde(rename = "todo")]
  Todo,
  #[serde(rename = "in-progress")]
  InProgress,
  #[serde(rename = "done")]
  Done
}

impl TaskStatus {
  pub const ALL: [TaskStatus; 3] = [
    TaskStatus::Todo,
    TaskStatus::InProgress,
    TaskStatus::Done
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | Self::Todo => "todo",
      | Self::InProgress => {
        "in-progress"
      }
      | Self::Done => "done"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::Todo => "To do",
      | Self::InProgress => {
        "In progress"
      }
      | Self::Done => "Done"
    }
  }

  pub fn parse(
    raw: &str
  ) -> Option<Self> {
    match raw.trim() {
      | "todo" => Some(Self::Todo),
      | "in-progress" => {
        Some(Self::InProgress)
      }
      | "done" => Some(Self::Done),
      | _ => None
    }
  }
}

impl fmt::Display for TaskStatus {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
  #[serde(alias = "_id")]
  pub id:       TaskId,
  #[serde(default)]
  pub title:    String,
  #[serde(default)]
  pub detail:   Option<String>,
  #[serde(default)]
  pub status:   TaskStatus,
  pub due_date: Option<DateTime<Utc>>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreate {
  pub title:    String,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub detail:   Option<String>,
  pub status:   TaskStatus,
  pub due_date: DateTime<Utc>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub title:    Option<String>,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub detail:   Option<String>,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub status:   Option<TaskStatus>,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub due_date: Option<DateTime<Utc>>
}

impl TaskPatch {
  pub fn status(
    status: TaskStatus
  ) -> Self {
    Self {
      status: Some(status),
      ..Self::default()
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct StatusCount {
  pub status: String,
  #[serde(default)]
  pub count:  u64
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatsDto {
  #[serde(default)]
  pub total:     u64,
  #[serde(default)]
  pub by_status: Vec<StatusCount>
}

impl TaskStatsDto {
  pub fn count_for(
    &self,
    status: TaskStatus
  ) -> u64 {
    self
      .by_status
      .iter()
      .find(|entry| {
        entry.status == status.as_str()
      })
      .map(|entry| entry.count)
      .unwrap_or(0)
  }
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct Credentials {
  pub email:    String,
  pub password: String
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
  pub first_name: String,
  pub last_name:  String,
  pub age:        u32,
  pub email:      String,
  pub password:   String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
  #[serde(default)]
  pub user_id: Option<String>,
  #[serde(default)]
  pub message: Option<String>
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct ForgotPasswordRequest {
  pub email: String
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct ResetPasswordRequest {
  pub password: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
  #[serde(default)]
  pub authenticated: Option<bool>,
  #[serde(default)]
  pub user_id:       Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDto {
  pub first_name: String,
  pub last_name:  String,
  #[serde(default)]
  pub age:        Option<u32>,
  pub email:      String,
  pub created_at: Option<DateTime<Utc>>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
  pub first_name: String,
  pub last_name:  String,
  pub age:        u32,
  pub email:      String
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct DeleteAccountRequest {
  pub password: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
)]
pub struct ApiMessage {
  #[serde(default)]
  pub message: Option<String>
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn task_reads_mongo_style_id_and_hyphenated_status()
   {
    let raw = r#"{
      "_id": "65f0c1",
      "title": "Configure router",
      "status": "in-progress",
      "dueDate": "2025-09-20T15:30:00Z"
    }"#;
    let task: TaskDto =
      serde_json::from_str(raw)
        .expect("task json");
    assert_eq!(
      task.id,
      TaskId::from("65f0c1")
    );
    assert_eq!(
      task.status,
      TaskStatus::InProgress
    );
    assert_eq!(task.detail, None);
  }

  #[test]
  fn status_patch_only_carries_status() {
    let patch =
      TaskPatch::status(TaskStatus::Done);
    let value =
      serde_json::to_value(&patch)
        .expect("patch json");
    assert_eq!(
      value,
      serde_json::json!({ "status": "done" })
    );
  }

  #[test]
  fn stats_missing_status_counts_as_zero() {
    let stats: TaskStatsDto =
      serde_json::from_str(
        r#"{"total": 3, "byStatus": [{"status": "done", "count": 2}]}"#
      )
      .expect("stats json");
    assert_eq!(
      stats.count_for(TaskStatus::Done),
      2
    );
    assert_eq!(
      stats.count_for(TaskStatus::Todo),
      0
    );
  }
}
