// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities expose what an identity may do with a ticket so clients
//! can hide controls. They are advisory only and do not replace the
//! checks in [`AuthorizationService`].

use zordon_hub_domain::Ticket;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::request_response::{Capability, TicketCapabilities};

/// Computes what `actor` may do with `ticket`.
///
/// The flags come from the same predicates the handlers enforce, so they
/// cannot drift from the access policy.
#[must_use]
pub fn compute_ticket_capabilities(
    actor: &AuthenticatedActor,
    ticket: &Ticket,
) -> TicketCapabilities {
    TicketCapabilities {
        can_change_status: Capability::from_bool(AuthorizationService::can_change_status(
            actor, ticket,
        )),
        can_assign: Capability::from_bool(actor.is_admin()),
        can_delete: Capability::from_bool(AuthorizationService::can_delete_ticket(actor, ticket)),
        can_comment: Capability::from_bool(AuthorizationService::can_read_ticket(actor, ticket)),
    }
}
