//! Email rendering with Handlebars
//!
//! Two template sets live here:
//! - the rich transaction emails sent by the dispatch service
//! - fallback snippets for queue requests that name a template instead of carrying HTML

mod fallback;
mod transaction;

pub use transaction::transaction_subject;

use crate::error::EmailResult;
use crate::models::{TransactionEmailData, TransactionEmailKind};
use handlebars::Handlebars;
use serde_json::{json, Value};

/// Subject and body ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Handlebars registry preloaded with every template the pipeline sends.
///
/// Values are HTML-escaped on render.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> EmailResult<Self> {
        let mut handlebars = Handlebars::new();

        handlebars.register_template_string(
            TransactionEmailKind::Pending.template_name(),
            transaction::pending_template(),
        )?;
        handlebars.register_template_string(
            TransactionEmailKind::Confirmed.template_name(),
            transaction::confirmed_template(),
        )?;
        handlebars.register_template_string(
            TransactionEmailKind::Rejected.template_name(),
            transaction::rejected_template(),
        )?;

        for (name, source) in fallback::SNIPPETS {
            handlebars.register_template_string(&fallback::registered_name(name), *source)?;
        }
        handlebars.register_template_string(&fallback::registered_name("generic"), fallback::GENERIC)?;

        Ok(Self { handlebars })
    }

    /// Subject from the type/status table, body from the matching transaction template.
    pub fn render_transaction(
        &self,
        kind: TransactionEmailKind,
        data: &TransactionEmailData,
    ) -> EmailResult<RenderedEmail> {
        let mut context = data.to_variables();
        context.insert(
            "typeLabel".into(),
            Value::String(transaction::type_label(&data.transaction_type).to_lowercase()),
        );
        context.insert(
            "statusLabel".into(),
            Value::String(transaction::type_label(&kind.to_string())),
        );

        let html = self
            .handlebars
            .render(kind.template_name(), &Value::Object(context))?;

        Ok(RenderedEmail {
            subject: transaction_subject(&data.transaction_type, kind).to_string(),
            html,
        })
    }

    /// Body for a named fallback template; unknown names dump `data` as JSON.
    pub fn render_fallback(&self, template: &str, data: &Value) -> EmailResult<String> {
        let name = fallback::registered_name(template);
        if fallback::SNIPPETS.iter().any(|(known, _)| *known == template) {
            return Ok(self.handlebars.render(&name, data)?);
        }

        let dump = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
        Ok(self
            .handlebars
            .render(&fallback::registered_name("generic"), &json!({ "json": dump }))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit(status: &str) -> TransactionEmailData {
        TransactionEmailData {
            transaction_id: "tx-42".into(),
            transaction_type: "deposit".into(),
            amount: "100.50".into(),
            currency: Some("USDC".into()),
            status: status.into(),
            tx_hash: Some("0xabc".into()),
            reason: None,
            timestamp: None,
        }
    }

    #[test]
    fn test_render_confirmed() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine
            .render_transaction(TransactionEmailKind::Confirmed, &deposit("confirmed"))
            .unwrap();

        assert_eq!(rendered.subject, "Deposit Confirmed");
        assert!(rendered.html.contains("tx-42"));
        assert!(rendered.html.contains("100.50 USDC"));
        assert!(rendered.html.contains("0xabc"));
        assert!(rendered.html.contains("Your deposit has been confirmed"));
    }

    #[test]
    fn test_render_rejected_includes_reason() {
        let engine = TemplateEngine::new().unwrap();
        let mut data = deposit("rejected");
        data.reason = Some("KYC incomplete".into());

        let rendered = engine
            .render_transaction(TransactionEmailKind::Rejected, &data)
            .unwrap();

        assert_eq!(rendered.subject, "Deposit Rejected");
        assert!(rendered.html.contains("KYC incomplete"));
    }

    #[test]
    fn test_render_pending_without_optional_fields() {
        let engine = TemplateEngine::new().unwrap();
        let mut data = deposit("pending");
        data.tx_hash = None;

        let rendered = engine
            .render_transaction(TransactionEmailKind::Pending, &data)
            .unwrap();

        assert!(!rendered.html.contains("Transaction Hash"));
        assert!(rendered.html.contains("awaiting confirmation"));
    }

    #[test]
    fn test_values_are_escaped() {
        let engine = TemplateEngine::new().unwrap();
        let mut data = deposit("rejected");
        data.reason = Some("<script>alert(1)</script>".into());

        let rendered = engine
            .render_transaction(TransactionEmailKind::Rejected, &data)
            .unwrap();
        assert!(!rendered.html.contains("<script>"));
    }

    #[test]
    fn test_fallback_snippet() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine
            .render_fallback(
                "transaction-confirmed",
                &json!({"transactionId": "tx-1", "amount": 5, "currency": "USDC"}),
            )
            .unwrap();

        assert!(html.contains("Transaction Confirmed"));
        assert!(html.contains("tx-1"));
        assert!(html.contains("5 USDC"));
    }

    #[test]
    fn test_fallback_unknown_template_dumps_json() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine
            .render_fallback("welcome", &json!({"name": "Ada"}))
            .unwrap();

        assert!(html.contains("<pre"));
        assert!(html.contains("name"));
        assert!(html.contains("Ada"));
    }
}
