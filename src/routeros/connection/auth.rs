// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! RouterOS authentication

use md5::compute as md5_compute;

use super::RouterOsConnection;
use crate::facts::DeviceError;

/// A trap during `/login` means the credentials were rejected
fn as_auth_error(e: DeviceError) -> DeviceError {
    match e {
        DeviceError::Protocol(msg) => DeviceError::Auth(msg),
        other => other,
    }
}

/// Builds the pre-6.43 challenge response: `00` + md5(0x00 + password + challenge)
pub(crate) fn challenge_response(password: &str, challenge_hex: &str) -> Result<String, DeviceError> {
    let challenge = hex::decode(challenge_hex)
        .map_err(|e| DeviceError::Auth(format!("invalid login challenge: {e}")))?;

    let mut data = Vec::with_capacity(1 + password.len() + challenge.len());
    data.push(0u8);
    data.extend_from_slice(password.as_bytes());
    data.extend_from_slice(&challenge);
    let digest = md5_compute(&data);
    Ok(format!("00{}", hex::encode(digest.0)))
}

impl RouterOsConnection {
    pub(crate) async fn login(&mut self, username: &str, password: &str) -> Result<(), DeviceError> {
        tracing::trace!("Attempting login for user: {}", username);
        let name = format!("=name={username}");

        // RouterOS 6.43+ accepts plain credentials; older releases answer with a challenge
        let plain = format!("=password={password}");
        let reply = self
            .command("/login", &[name.as_str(), plain.as_str()])
            .await
            .map_err(as_auth_error)?;

        let Some(challenge) = reply.iter().find_map(|s| s.get("ret")) else {
            tracing::debug!("Login successful");
            return Ok(());
        };

        tracing::trace!("Challenge received, length: {}", challenge.len());
        let response = format!("=response={}", challenge_response(password, challenge)?);
        self.command("/login", &[name.as_str(), response.as_str()])
            .await
            .map_err(as_auth_error)?;
        tracing::debug!("Login successful (legacy method)");
        Ok(())
    }
}
