// Paperlib - Academic paper library client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Paper service API client
//!
//! Route table, token handling, transport and the [`ApiClient`] that ties them
//! together, plus the wire models and the Firebase identity provider.

pub mod auth;
pub mod cancel;
pub mod client;
pub mod firebase;
pub mod mappings;
pub mod routes;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use auth::{AuthToken, AuthTokenProvider, IdentityProvider, SessionUser, StaticTokenIdentity};
pub use cancel::{CancelController, CancelSignal};
pub use client::{ApiClient, ApiContext, Outcome, RequestConfig};
pub use firebase::{FirebaseAuth, FirebaseSession, FirebaseUser};
pub use mappings::{external_links, ExternalLink};
pub use routes::RouteFn;
pub use transport::{HttpExecutor, RequestDescriptor, RequestExecutor, TransportResponse};
