// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outbound mail transport that writes to the log.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};
use zordon_hub_api::{MailError, MailReceipt, Mailer, OutgoingMail};

/// Logs each message instead of delivering it and hands back a synthetic
/// message id.
#[derive(Debug, Default)]
pub struct TracingMailer {
    sent: AtomicU64,
}

impl TracingMailer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sent: AtomicU64::new(0),
        }
    }
}

impl Mailer for TracingMailer {
    fn send_mail(&self, mail: &OutgoingMail) -> Result<MailReceipt, MailError> {
        if mail.to.is_empty() {
            return Err(MailError::Rejected(String::from("No recipient")));
        }

        let sequence: u64 = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        let message_id: String = format!("<{sequence}@zordon-hub.local>");
        info!(to = %mail.to, subject = %mail.subject, %message_id, "Outgoing mail");
        debug!(body = %mail.text, "Outgoing mail body");

        Ok(MailReceipt { message_id })
    }
}
