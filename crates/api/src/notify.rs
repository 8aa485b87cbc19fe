// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification dispatch.
//!
//! The lifecycle engine emits [`NotificationRequest`]s as data. This module
//! turns them into mail and hands it to an injected [`Mailer`]. Delivery is
//! best effort: a failure is reported for that one notification and never
//! undoes the mutation that produced it.

use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{error, info, warn};
use zordon_hub::{NotificationKind, NotificationRequest, select_deadline_candidates};
use zordon_hub_domain::{
    DEFAULT_DEADLINE_WINDOW_HOURS, Ticket, User, format_remaining, validate_deadline_window,
};
use zordon_hub_persistence::Persistence;

use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{DeadlineSweepResponse, NotificationResult, format_timestamp};

/// Mail delivery errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MailError {
    /// The transport refused this message.
    #[error("Mail rejected: {0}")]
    Rejected(String),

    /// The transport could not be reached.
    #[error("Mail transport unavailable: {0}")]
    Unavailable(String),
}

/// An outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Proof that a transport accepted a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailReceipt {
    pub message_id: String,
}

/// Outbound email transport.
pub trait Mailer: Send + Sync {
    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport does not accept the message.
    fn send_mail(&self, mail: &OutgoingMail) -> Result<MailReceipt, MailError>;
}

/// Builds the mail for one notification.
///
/// `due_date` only matters for deadline reminders.
#[must_use]
pub fn compose_mail(
    request: &NotificationRequest,
    recipient: &User,
    due_date: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> OutgoingMail {
    let ticket_ref: String = format!("#{} \"{}\"", request.ticket_id, request.ticket_title);

    let (subject, body): (String, String) = match &request.kind {
        NotificationKind::AssignedToYou => (
            format!("Ticket #{} assigned to you", request.ticket_id),
            format!("Ticket {ticket_ref} has been assigned to you."),
        ),
        NotificationKind::ReporterTicketAssigned { assignee_name } => (
            format!("Your ticket #{} has been assigned", request.ticket_id),
            format!("Your ticket {ticket_ref} is now being handled by {assignee_name}."),
        ),
        NotificationKind::DeadlineApproaching => {
            let due: String = due_date.map_or_else(|| String::from("soon"), format_timestamp);
            (
                format!("Deadline approaching for ticket #{}", request.ticket_id),
                format!(
                    "Ticket {ticket_ref} is due {due} ({}).",
                    format_remaining(due_date, now)
                ),
            )
        }
    };

    OutgoingMail {
        to: recipient.email.clone(),
        subject,
        text: format!("Hello {},\n\n{body}\n\nZordon Hub", recipient.name),
        html: format!(
            "<p>Hello {},</p><p>{body}</p><p>Zordon Hub</p>",
            recipient.name
        ),
    }
}

/// Resolves the recipient, composes and sends one notification.
fn deliver(
    persistence: &mut Persistence,
    mailer: &dyn Mailer,
    request: &NotificationRequest,
    due_date: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> NotificationResult {
    let failure = |message: String| NotificationResult {
        ticket_id: request.ticket_id,
        recipient_id: request.recipient_id,
        success: false,
        message_id: None,
        error: Some(message),
    };

    let recipient: User = match persistence.get_user(request.recipient_id) {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(
                recipient_id = request.recipient_id,
                "Notification recipient does not exist"
            );
            return failure(String::from("Recipient not found"));
        }
        Err(e) => {
            error!(error = %e, "Failed to load notification recipient");
            return failure(String::from("Recipient lookup failed"));
        }
    };

    let mail: OutgoingMail = compose_mail(request, &recipient, due_date, now);
    match mailer.send_mail(&mail) {
        Ok(receipt) => {
            info!(
                ticket_id = request.ticket_id,
                recipient_id = request.recipient_id,
                message_id = %receipt.message_id,
                "Notification sent"
            );
            NotificationResult {
                ticket_id: request.ticket_id,
                recipient_id: request.recipient_id,
                success: true,
                message_id: Some(receipt.message_id),
                error: None,
            }
        }
        Err(e) => {
            warn!(
                ticket_id = request.ticket_id,
                recipient_id = request.recipient_id,
                error = %e,
                "Notification delivery failed"
            );
            failure(e.to_string())
        }
    }
}

/// Sends every notification in order, collecting one result each.
///
/// Never fails as a whole.
pub fn dispatch_notifications(
    persistence: &mut Persistence,
    mailer: &dyn Mailer,
    requests: &[NotificationRequest],
    now: OffsetDateTime,
) -> Vec<NotificationResult> {
    requests
        .iter()
        .map(|request| deliver(persistence, mailer, request, None, now))
        .collect()
}

/// Sends a reminder for every assigned, active ticket due within the next
/// `window_hours` hours that has not had one yet.
///
/// A ticket is flagged as reminded only after its mail is accepted, so a
/// failed send is retried by the next sweep. A crash between send and flag
/// can repeat a reminder; delivery is at least once.
///
/// # Errors
///
/// Returns an error if the window is not positive or the candidate query
/// fails. Per-ticket failures are reported in the results instead.
pub fn run_deadline_sweep(
    persistence: &mut Persistence,
    mailer: &dyn Mailer,
    window_hours: Option<i64>,
    now: OffsetDateTime,
) -> Result<DeadlineSweepResponse, ApiError> {
    let window_hours: i64 = window_hours.unwrap_or(DEFAULT_DEADLINE_WINDOW_HOURS);
    validate_deadline_window(window_hours).map_err(translate_domain_error)?;

    let pool: Vec<Ticket> = persistence.list_deadline_pool()?;
    let requests: Vec<NotificationRequest> =
        select_deadline_candidates(&pool, now, Duration::hours(window_hours));

    let mut results: Vec<NotificationResult> = Vec::with_capacity(requests.len());
    for request in &requests {
        let due_date: Option<OffsetDateTime> = pool
            .iter()
            .find(|t| t.ticket_id == request.ticket_id)
            .and_then(|t| t.due_date);

        let mut result: NotificationResult = deliver(persistence, mailer, request, due_date, now);
        if result.success
            && let Err(e) = persistence.mark_deadline_notified(request.ticket_id)
        {
            error!(
                ticket_id = request.ticket_id,
                error = %e,
                "Reminder sent but could not be recorded"
            );
            result.success = false;
            result.error = Some(String::from("Reminder sent but could not be recorded"));
        }
        results.push(result);
    }

    let sent: usize = results.iter().filter(|r| r.success).count();
    info!(
        window_hours,
        candidates = requests.len(),
        sent,
        "Deadline sweep complete"
    );

    Ok(DeadlineSweepResponse {
        window_hours,
        candidates: requests.len(),
        sent,
        results,
    })
}
