// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod gate;
pub mod password;
pub mod token;

pub use gate::{AuthError, AuthGate, GateDecision, PathClass, RouteTable, TOKEN_COOKIE};
pub use password::PasswordHasher;
pub use token::{Identity, Role, TokenClaims, TokenCodec, TokenError};
