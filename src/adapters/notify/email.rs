//! Notifier that renders HTML and plain-text emails and hands them to an
//! [`EmailTransport`].

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::public::ResultSummary;
use crate::ports::{
    EmailTransport, NewLeadNotice, NotificationError, Notifier, OutgoingEmail, ResultNotice,
};

pub struct EmailNotifier {
    transport: Arc<dyn EmailTransport>,
}

impl EmailNotifier {
    pub fn new(transport: Arc<dyn EmailTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn new_lead(&self, notice: &NewLeadNotice) -> Result<(), NotificationError> {
        if notice.recipients.is_empty() {
            return Err(NotificationError::NoRecipients);
        }
        let email = render_new_lead(notice);
        self.transport.send(&email).await?;
        tracing::info!(
            lead_id = %notice.lead.id,
            recipients = %notice.recipients.join(", "),
            "New lead alert sent"
        );
        Ok(())
    }

    async fn deliver_result(&self, notice: &ResultNotice) -> Result<(), NotificationError> {
        let email = render_result(notice);
        self.transport.send(&email).await?;
        tracing::info!(token = %notice.summary.token, "Result summary delivered");
        Ok(())
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn or_unset(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("Not provided")
}

/// Alert for the type's recipients: contact block, score and the answers
/// grouped by domain.
pub fn render_new_lead(notice: &NewLeadNotice) -> OutgoingEmail {
    let lead = &notice.lead;
    let contact = &lead.contact;
    let email = contact.email.as_ref().map(|e| e.as_str());
    let subject = format!("New Lead Captured - {}", notice.type_name);

    let mut text = String::new();
    let _ = writeln!(text, "{}\n", subject);
    let _ = writeln!(text, "Name: {}", or_unset(contact.name.as_deref()));
    let _ = writeln!(text, "Email: {}", or_unset(email));
    let _ = writeln!(text, "Phone: {}", or_unset(contact.phone.as_deref()));
    let _ = writeln!(text, "Company: {}", or_unset(contact.company.as_deref()));
    let _ = writeln!(text, "\nScore: {:.1}%\n", lead.overall_score);
    for domain in &notice.digest {
        let _ = writeln!(text, "{}", domain.domain);
        for line in &domain.lines {
            let _ = writeln!(text, "  - {}: {}", line.question, line.answer.label());
        }
    }
    text.push_str("\nThis lead completed the public assessment and is waiting to be contacted.\n");

    let mut html = String::new();
    let _ = write!(html, "<h2>{}</h2><table>", escape(&subject));
    for (label, value) in [
        ("Name", or_unset(contact.name.as_deref())),
        ("Email", or_unset(email)),
        ("Phone", or_unset(contact.phone.as_deref())),
        ("Company", or_unset(contact.company.as_deref())),
    ] {
        let _ = write!(html, "<tr><th>{}</th><td>{}</td></tr>", label, escape(value));
    }
    let _ = write!(
        html,
        "</table><p><strong>Score:</strong> {:.1}%</p>",
        lead.overall_score
    );
    for domain in &notice.digest {
        let _ = write!(html, "<h3>{}</h3><ul>", escape(&domain.domain));
        for line in &domain.lines {
            let _ = write!(
                html,
                "<li>{}: <strong>{}</strong></li>",
                escape(&line.question),
                line.answer.label()
            );
        }
        html.push_str("</ul>");
    }

    OutgoingEmail {
        to: notice.recipients.clone(),
        subject,
        html_body: html,
        text_body: text,
    }
}

fn summary_lines(summary: &ResultSummary) -> Vec<(String, String)> {
    summary
        .domains
        .iter()
        .map(|d| (format!("{}: {:.1}%", d.name, d.score), d.recommendation.clone()))
        .collect()
}

/// Copy of the visitor's result.
pub fn render_result(notice: &ResultNotice) -> OutgoingEmail {
    let summary = &notice.summary;
    let subject = format!("Your {} result", summary.type_name);
    let lines = summary_lines(summary);

    let mut text = String::new();
    let _ = writeln!(
        text,
        "Overall: {:.1}% ({})\n",
        summary.overall,
        summary.maturity.as_str()
    );
    for (heading, recommendation) in &lines {
        let _ = writeln!(text, "{}\n  {}", heading, recommendation);
    }
    if let Some(url) = &notice.result_url {
        let _ = writeln!(text, "\nView online: {}", url);
    }
    if let Some(cta) = &summary.cta_text {
        let _ = writeln!(text, "\n{}", cta);
    }

    let mut html = String::new();
    let _ = write!(
        html,
        "<h2>{}</h2><p><strong>Overall:</strong> {:.1}% ({})</p>",
        escape(&subject),
        summary.overall,
        summary.maturity.as_str()
    );
    for (heading, recommendation) in &lines {
        let _ = write!(
            html,
            "<h3>{}</h3><p>{}</p>",
            escape(heading),
            escape(recommendation)
        );
    }
    if let Some(url) = &notice.result_url {
        let _ = write!(html, "<p><a href=\"{0}\">{0}</a></p>", escape(url));
    }
    if let Some(cta) = &summary.cta_text {
        let _ = write!(html, "<p>{}</p>", escape(cta));
    }

    OutgoingEmail {
        to: vec![notice.recipient.as_str().to_string()],
        subject,
        html_body: html,
        text_body: text,
    }
}
