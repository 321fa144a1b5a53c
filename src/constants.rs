//! Endpoint and file name defaults shared by the CLI, config and adapters.

// Microsoft Graph
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const APPROVALS_URL: &str = "https://graph.microsoft.com/beta/solutions/approval/approvalItems";
pub const ODATA_NEXT_LINK: &str = "@odata.nextLink";

// Output files
pub const OUTPUT_FILENAME: &str = "approvals.csv";
pub const CLEAN_OUTPUT_FILENAME: &str = "datos_completos_power_bi.csv";
pub const OUTPUT_DIR: &str = "output";

// Placeholder for ticket ids and detail metadata that are not present
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw CSV column names, in the order the flattener writes them
pub mod raw {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const APPROVAL_TYPE: &str = "approvalType";
    pub const CREATED: &str = "createdDateTime";
    pub const ALLOW_CANCEL: &str = "allowCancel";
    pub const ALLOW_EMAIL_NOTIFICATIONS: &str = "allowEmailNotifications";
    pub const DESCRIPTION: &str = "description";
    pub const COMPLETED: &str = "completedDateTime";
    pub const RESPONSE_PROMPTS: &str = "responsePrompts";
    pub const STATE: &str = "state";
    pub const RESULT: &str = "result";
    pub const APPROVERS: &str = "approvers";
    pub const VIEW_POINT: &str = "viewPoint";
    pub const OWNER: &str = "owner";

    pub const HEADER: [&str; 14] = [
        ID,
        TITLE,
        APPROVAL_TYPE,
        CREATED,
        ALLOW_CANCEL,
        ALLOW_EMAIL_NOTIFICATIONS,
        DESCRIPTION,
        COMPLETED,
        RESPONSE_PROMPTS,
        STATE,
        RESULT,
        APPROVERS,
        VIEW_POINT,
        OWNER,
    ];
}
