//! Message rendering for contact submissions
//!
//! Two messages per submission: an admin notification (mandatory) and
//! a confirmation back to the submitter (best-effort). Bodies are
//! rendered as inline-styled HTML plus a plain-text alternative.

use courier_delivery::OutboundMessage;

use crate::config::ContactConfig;
use crate::types::ContactSubmission;

/// Build the admin notification message.
///
/// The subject depends on the submission source; `reply_to` is set to
/// the submitter so the admin can answer directly.
pub fn admin_message(submission: &ContactSubmission, config: &ContactConfig) -> OutboundMessage {
    let subject = if submission.source.to_lowercase() == "portfolio submission" {
        format!("📁 New Portfolio Submission – {}", config.site_name)
    } else {
        format!("🌐 New Website Enquiry – {}", config.site_name)
    };

    OutboundMessage {
        to: config.admin_email.clone(),
        to_name: None,
        cc: None,
        bcc: None,
        reply_to: Some(submission.email.clone()),
        subject,
        html: Some(admin_html(submission, config)),
        text: Some(admin_text(submission)),
    }
}

/// Build the submitter confirmation message
pub fn confirmation_message(
    submission: &ContactSubmission,
    config: &ContactConfig,
) -> OutboundMessage {
    OutboundMessage {
        to: submission.email.clone(),
        to_name: Some(submission.name.clone()),
        cc: None,
        bcc: None,
        reply_to: None,
        subject: format!("{} – We've received your enquiry", config.site_name),
        html: Some(confirmation_html(submission, config)),
        text: Some(confirmation_text(submission, config)),
    }
}

fn admin_text(submission: &ContactSubmission) -> String {
    format!(
        "Source: {source}\n\n{source}:\n\nName:\n{name}\n\nEmail:\n{email}\n\nPhone:\n{phone}\n\nMessage:\n{message}\n",
        source = submission.source,
        name = submission.name,
        email = submission.email,
        phone = submission.phone_display(),
        message = submission.message,
    )
}

fn admin_html(submission: &ContactSubmission, config: &ContactConfig) -> String {
    format!(
        r#"<html>
  <body style="margin:0;padding:20px;background:#f4f6f8;font-family:Arial,Helvetica,sans-serif;">
    <div style="max-width:680px;margin:0 auto;background:#ffffff;border-radius:8px;box-shadow:0 2px 8px rgba(16,24,40,0.08);overflow:hidden;">
      <div style="background:linear-gradient(90deg,#b8860b,#ffd700);padding:20px 24px;color:#fff;">
        <h1 style="margin:0;font-size:18px">{site}</h1>
        <p style="margin:6px 0 0;font-size:13px;opacity:0.9"><b>Source:</b> {source}</p>
      </div>
      <div style="padding:24px;color:#0f172a;font-size:14px;line-height:1.5">
        <table cellpadding="0" cellspacing="0" width="100%" style="border-collapse:collapse;margin-bottom:16px;">
          <tr><td style="padding:6px 0;font-weight:600;width:110px;">Name</td><td style="padding:6px 0;">{name}</td></tr>
          <tr><td style="padding:6px 0;font-weight:600;">Email</td><td style="padding:6px 0;">{email}</td></tr>
          <tr><td style="padding:6px 0;font-weight:600;">Phone</td><td style="padding:6px 0;">{phone}</td></tr>
        </table>
        <div style="margin-top:8px;padding:16px;background:#f8fafc;border-radius:6px;white-space:pre-wrap">{message}</div>
      </div>
    </div>
  </body>
</html>
"#,
        site = escape_html(&config.site_name),
        source = escape_html(&submission.source),
        name = escape_html(&submission.name),
        email = escape_html(&submission.email),
        phone = escape_html(submission.phone_display()),
        message = escape_html(&submission.message),
    )
}

fn confirmation_text(submission: &ContactSubmission, config: &ContactConfig) -> String {
    format!(
        "Hi {name},\n\nThank you for contacting {site}. We've received your enquiry and a member of our team will be in touch soon.\n\nHere is a copy of your submission:\n\nName:\n{name}\n\nEmail:\n{email}\n\nPhone:\n{phone}\n\nMessage:\n{message}\n\n— {site}",
        name = submission.name,
        site = config.site_name,
        email = submission.email,
        phone = submission.phone_display(),
        message = submission.message,
    )
}

fn confirmation_html(submission: &ContactSubmission, config: &ContactConfig) -> String {
    format!(
        r#"<html>
  <body style="margin:0;padding:20px;background:#f4f6f8;font-family:Arial,Helvetica,sans-serif;color:#0f172a;">
    <div style="max-width:680px;margin:0 auto;background:#ffffff;border-radius:8px;overflow:hidden;">
      <div style="background:#0f172a;padding:20px 24px;color:#fff;">
        <h1 style="margin:0;font-size:20px">We've received your enquiry</h1>
      </div>
      <div style="padding:24px;font-size:14px;line-height:1.6;">
        <p style="margin:0 0 12px;">Hi {name},</p>
        <p style="margin:0 0 12px;">Thank you for contacting <strong>{site}</strong>. We've received your enquiry and a member of our team will be in touch soon.</p>
        <h2 style="font-size:15px;margin:18px 0 8px;">Your submission</h2>
        <table width="100%" cellpadding="6" cellspacing="0" style="border-collapse:collapse;font-size:14px;">
          <tr><td style="width:120px;font-weight:600;">Name</td><td>{name}</td></tr>
          <tr><td style="font-weight:600;">Email</td><td>{email}</td></tr>
          <tr><td style="font-weight:600;">Phone</td><td>{phone}</td></tr>
          <tr><td style="font-weight:600;vertical-align:top;">Message</td><td style="white-space:pre-wrap">{message}</td></tr>
        </table>
        <p style="margin:18px 0 0;">Kind regards,<br><strong>{site} Team</strong></p>
      </div>
    </div>
  </body>
</html>
"#,
        name = escape_html(&submission.name),
        site = escape_html(&config.site_name),
        email = escape_html(&submission.email),
        phone = escape_html(submission.phone_display()),
        message = escape_html(&submission.message),
    )
}

/// Minimal HTML entity escaping for user-supplied field values
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
