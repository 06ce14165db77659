//! Transaction lifecycle emails

use crate::models::TransactionEmailKind;

/// Subject lines per transaction type: pending, confirmed, rejected
const SUBJECTS: &[(&str, [&str; 3])] = &[
    (
        "deposit",
        ["Deposit Pending Confirmation", "Deposit Confirmed", "Deposit Rejected"],
    ),
    (
        "withdrawal",
        ["Withdrawal Request Received", "Withdrawal Completed", "Withdrawal Rejected"],
    ),
    (
        "transfer",
        ["Transfer Pending", "Transfer Completed", "Transfer Failed"],
    ),
    (
        "mint",
        ["Mint Request Pending", "Tokens Minted Successfully", "Mint Request Rejected"],
    ),
    (
        "burn",
        ["Redemption Pending", "Redemption Completed", "Redemption Rejected"],
    ),
    (
        "redeem",
        ["Redemption Pending", "Redemption Completed", "Redemption Rejected"],
    ),
];

const GENERIC_SUBJECTS: [&str; 3] = [
    "Transaction Pending",
    "Transaction Confirmed",
    "Transaction Rejected",
];

fn column(kind: TransactionEmailKind) -> usize {
    match kind {
        TransactionEmailKind::Pending => 0,
        TransactionEmailKind::Confirmed => 1,
        TransactionEmailKind::Rejected => 2,
    }
}

/// Subject for a transaction type at a lifecycle stage; unknown types get a generic subject.
pub fn transaction_subject(transaction_type: &str, kind: TransactionEmailKind) -> &'static str {
    let normalized = transaction_type.trim().to_ascii_lowercase();
    SUBJECTS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, subjects)| subjects[column(kind)])
        .unwrap_or(GENERIC_SUBJECTS[column(kind)])
}

/// "deposit" -> "Deposit"
pub(crate) fn type_label(transaction_type: &str) -> String {
    let trimmed = transaction_type.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => "Transaction".to_string(),
    }
}

fn layout(accent: &str, heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{heading}</title></head>
<body style="margin:0;padding:0;background:#f4f5f7;font-family:Arial,Helvetica,sans-serif;color:#1f2933;">
  <table width="100%" cellpadding="0" cellspacing="0" style="padding:24px 0;">
    <tr><td align="center">
      <table width="600" cellpadding="0" cellspacing="0" style="background:#ffffff;border-radius:8px;overflow:hidden;">
        <tr><td style="background:{accent};padding:20px 32px;color:#ffffff;font-size:20px;font-weight:bold;">{heading}</td></tr>
        <tr><td style="padding:32px;">
{body}
        </td></tr>
        <tr><td style="padding:16px 32px;background:#f9fafb;font-size:12px;color:#7b8794;">
          This is an automated message about activity on your account. Please do not reply.
        </td></tr>
      </table>
    </td></tr>
  </table>
</body>
</html>"#
    )
}

const DETAILS: &str = r#"          <table cellpadding="6" cellspacing="0" style="width:100%;border-collapse:collapse;font-size:14px;">
            <tr><td style="color:#7b8794;">Transaction ID</td><td>{{transactionId}}</td></tr>
            <tr><td style="color:#7b8794;">Type</td><td>{{typeLabel}}</td></tr>
            <tr><td style="color:#7b8794;">Amount</td><td><strong>{{amount}} {{currency}}</strong></td></tr>
            <tr><td style="color:#7b8794;">Status</td><td>{{statusLabel}}</td></tr>
            {{#if txHash}}<tr><td style="color:#7b8794;">Transaction Hash</td><td style="font-family:monospace;word-break:break-all;">{{txHash}}</td></tr>{{/if}}
            {{#if timestamp}}<tr><td style="color:#7b8794;">Date</td><td>{{timestamp}}</td></tr>{{/if}}
          </table>"#;

pub(crate) fn pending_template() -> String {
    layout(
        "#d97706",
        "Transaction Pending",
        &format!(
            r#"          <p>Hello,</p>
          <p>We received your {{{{typeLabel}}}} request. It is now awaiting confirmation and we will email you again once it has been processed.</p>
{DETAILS}
          <p>No action is needed from you right now.</p>"#
        ),
    )
}

pub(crate) fn confirmed_template() -> String {
    layout(
        "#059669",
        "Transaction Confirmed",
        &format!(
            r#"          <p>Hello,</p>
          <p>Good news! Your {{{{typeLabel}}}} has been confirmed successfully.</p>
{DETAILS}
          <p>The funds are now reflected in your account balance.</p>"#
        ),
    )
}

pub(crate) fn rejected_template() -> String {
    layout(
        "#dc2626",
        "Transaction Rejected",
        &format!(
            r#"          <p>Hello,</p>
          <p>Unfortunately your {{{{typeLabel}}}} could not be completed.</p>
{DETAILS}
          {{{{#if reason}}}}<p style="padding:12px;background:#fef2f2;border-left:4px solid #dc2626;"><strong>Reason:</strong> {{{{reason}}}}</p>{{{{/if}}}}
          <p>If you believe this is a mistake, please contact support and quote the transaction ID above.</p>"#
        ),
    )
}
