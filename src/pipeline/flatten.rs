use serde_json::Value;

use crate::constants::raw;
use crate::types::{RawApprovalItem, RawApprovalRecord};

/// Text form of a JSON value for a CSV cell
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn field(item: &RawApprovalItem, path: &[&str]) -> String {
    let mut current = Some(item);
    for key in path {
        current = current.and_then(|v| v.get(key));
    }
    cell_text(current)
}

/// Semicolon-joined `approvers[*].user.id`
fn approver_ids(item: &RawApprovalItem) -> String {
    item.get("approvers")
        .and_then(Value::as_array)
        .map(|approvers| {
            approvers
                .iter()
                .map(|a| field(a, &["user", "id"]))
                .collect::<Vec<_>>()
                .join(";")
        })
        .unwrap_or_default()
}

/// Flatten one Graph approval item into a raw table row
pub fn flatten_approval(item: &RawApprovalItem) -> RawApprovalRecord {
    let mut record = RawApprovalRecord::new();
    record.insert(raw::ID, field(item, &["id"]));
    record.insert(raw::TITLE, field(item, &["displayName"]));
    record.insert(raw::APPROVAL_TYPE, field(item, &["approvalType"]));
    record.insert(raw::CREATED, field(item, &["createdDateTime"]));
    record.insert(raw::ALLOW_CANCEL, field(item, &["allowCancel"]));
    record.insert(
        raw::ALLOW_EMAIL_NOTIFICATIONS,
        field(item, &["allowEmailNotifications"]),
    );
    record.insert(raw::DESCRIPTION, field(item, &["description"]));
    record.insert(raw::COMPLETED, field(item, &["completedDateTime"]));
    record.insert(raw::RESPONSE_PROMPTS, field(item, &["responsePrompts"]));
    record.insert(raw::STATE, field(item, &["state"]));
    record.insert(raw::RESULT, field(item, &["result"]));
    record.insert(raw::APPROVERS, approver_ids(item));
    record.insert(raw::VIEW_POINT, field(item, &["viewPoint", "roles"]));
    record.insert(raw::OWNER, field(item, &["owner", "user", "id"]));
    record
}

pub fn flatten_approvals(items: &[RawApprovalItem]) -> Vec<RawApprovalRecord> {
    items.iter().map(flatten_approval).collect()
}
