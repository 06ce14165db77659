//! Short HTML bodies for ad-hoc queue requests that name a template but carry no HTML

/// (template name, handlebars source)
pub(crate) const SNIPPETS: &[(&str, &str)] = &[
    (
        "transaction-confirmed",
        r#"<h2>Transaction Confirmed</h2>
<p>Your {{#if transactionType}}{{transactionType}} {{/if}}transaction{{#if transactionId}} <strong>{{transactionId}}</strong>{{/if}} has been confirmed.</p>
{{#if amount}}<p>Amount: {{amount}} {{currency}}</p>{{/if}}"#,
    ),
    (
        "transaction-pending",
        r#"<h2>Transaction Pending</h2>
<p>Your {{#if transactionType}}{{transactionType}} {{/if}}transaction{{#if transactionId}} <strong>{{transactionId}}</strong>{{/if}} is pending confirmation.</p>
{{#if amount}}<p>Amount: {{amount}} {{currency}}</p>{{/if}}"#,
    ),
    (
        "transaction-rejected",
        r#"<h2>Transaction Rejected</h2>
<p>Your {{#if transactionType}}{{transactionType}} {{/if}}transaction{{#if transactionId}} <strong>{{transactionId}}</strong>{{/if}} was rejected.</p>
{{#if reason}}<p>Reason: {{reason}}</p>{{/if}}"#,
    ),
];

/// Body for any other template name
pub(crate) const GENERIC: &str = r#"<h2>Notification</h2>
<pre style="white-space:pre-wrap;">{{json}}</pre>"#;

pub(crate) fn registered_name(template: &str) -> String {
    format!("fallback/{template}")
}
