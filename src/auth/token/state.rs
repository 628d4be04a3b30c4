//! Application token state and freshness classification.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Freshness of an [`AuthTokenState`] relative to an instant and a look-ahead buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Freshness {
	/// Access or refresh token is missing; there is no authorization to maintain.
	Unauthorized,
	/// The refresh token expired; the user must authorize again.
	RefreshExpired,
	/// The access token has no known expiry, so staleness cannot be decided.
	UnknownExpiry,
	/// The access token outlives the look-ahead buffer.
	Fresh,
	/// The access token expires within the look-ahead buffer (or already expired).
	Stale,
}
impl Freshness {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Freshness::Unauthorized => "unauthorized",
			Freshness::RefreshExpired => "refresh_expired",
			Freshness::UnknownExpiry => "unknown_expiry",
			Freshness::Fresh => "fresh",
			Freshness::Stale => "stale",
		}
	}
}
impl Display for Freshness {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Application authorization tokens as stored by the extension.
///
/// The state is owned by the token store. The refresh scheduler only reads it, except for the
/// full reset it triggers once the refresh token is known to be expired; everything else is
/// written by the external refresh operation.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenState {
	/// Short-lived credential used to authorize API calls.
	#[serde(default)]
	pub access_token: Option<TokenSecret>,
	/// Longer-lived credential used to mint new access tokens.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
	/// Expiry instant of the access token, when known. Stored as epoch milliseconds.
	#[serde(default, with = "epoch_millis")]
	pub access_token_expires_at: Option<OffsetDateTime>,
	/// Expiry instant of the refresh token, when known. Stored as epoch milliseconds.
	#[serde(default, with = "epoch_millis")]
	pub refresh_token_expires_at: Option<OffsetDateTime>,
}
impl AuthTokenState {
	/// Sets the access token.
	pub fn with_access_token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.access_token = Some(token.into());

		self
	}

	/// Sets the refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(token.into());

		self
	}

	/// Sets the access token expiry.
	pub fn with_access_token_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.access_token_expires_at = Some(instant);

		self
	}

	/// Sets the refresh token expiry.
	pub fn with_refresh_token_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.refresh_token_expires_at = Some(instant);

		self
	}

	/// Returns `true` when both an access token and a refresh token are present.
	///
	/// Empty strings count as absent.
	pub fn is_authorized(&self) -> bool {
		let present = |token: &Option<TokenSecret>| token.as_ref().is_some_and(|t| !t.is_empty());

		present(&self.access_token) && present(&self.refresh_token)
	}

	/// Returns `true` if the refresh token has a known expiry at or before `instant`.
	pub fn is_refresh_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.refresh_token_expires_at.is_some_and(|expires_at| expires_at <= instant)
	}

	/// Classifies the state at `now`, treating tokens that expire within `buffer` as stale.
	///
	/// Negative buffers are treated as zero. A buffer reaching past the representable range
	/// covers every expiry, so the state is stale.
	pub fn freshness_at(&self, now: OffsetDateTime, buffer: Duration) -> Freshness {
		if !self.is_authorized() {
			return Freshness::Unauthorized;
		}
		if self.is_refresh_expired_at(now) {
			return Freshness::RefreshExpired;
		}

		let Some(expires_at) = self.access_token_expires_at else {
			return Freshness::UnknownExpiry;
		};
		let buffer = if buffer.is_negative() { Duration::ZERO } else { buffer };

		match now.checked_add(buffer) {
			Some(limit) if expires_at > limit => Freshness::Fresh,
			_ => Freshness::Stale,
		}
	}

	/// Convenience helper that classifies the state against the current UTC instant.
	pub fn freshness(&self, buffer: Duration) -> Freshness {
		self.freshness_at(OffsetDateTime::now_utc(), buffer)
	}
}
impl Debug for AuthTokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthTokenState")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("access_token_expires_at", &self.access_token_expires_at)
			.field("refresh_token_expires_at", &self.refresh_token_expires_at)
			.finish()
	}
}

mod epoch_millis {
	// crates.io
	use serde::{Deserializer, Serializer, de::Error as _};
	// self
	use crate::_prelude::*;

	const NANOS_PER_MILLI: i128 = 1_000_000;

	pub(super) fn serialize<S>(
		instant: &Option<OffsetDateTime>,
		serializer: S,
	) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match instant {
			Some(instant) => {
				let millis = instant.unix_timestamp_nanos() / NANOS_PER_MILLI;

				serializer.serialize_i64(millis as i64)
			},
			None => serializer.serialize_none(),
		}
	}

	/// Accepts integer or floating-point millis; hosts store JS numbers. `0` means no expiry.
	pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let Some(millis) = Option::<f64>::deserialize(deserializer)? else {
			return Ok(None);
		};

		if !millis.is_finite() {
			return Err(D::Error::custom(format!("expiry must be finite, got {millis}")));
		}
		if millis == 0.0 {
			return Ok(None);
		}

		let nanos = (millis.trunc() as i128).saturating_mul(NANOS_PER_MILLI);

		OffsetDateTime::from_unix_timestamp_nanos(nanos).map(Some).map_err(D::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	const NOW: OffsetDateTime = macros::datetime!(2025-06-01 12:00 UTC);
	const BUFFER: Duration = Duration::minutes(10);

	fn authorized() -> AuthTokenState {
		AuthTokenState::default()
			.with_access_token("a")
			.with_refresh_token("r")
			.with_refresh_token_expires_at(NOW + Duration::days(30))
	}

	#[test]
	fn missing_tokens_are_unauthorized() {
		let only_access = AuthTokenState::default()
			.with_access_token("a")
			.with_access_token_expires_at(NOW - Duration::minutes(1));
		let empty_refresh = authorized().with_refresh_token("");

		assert_eq!(AuthTokenState::default().freshness_at(NOW, BUFFER), Freshness::Unauthorized);
		assert_eq!(only_access.freshness_at(NOW, BUFFER), Freshness::Unauthorized);
		assert_eq!(empty_refresh.freshness_at(NOW, BUFFER), Freshness::Unauthorized);
	}

	#[test]
	fn refresh_expiry_wins_over_access_expiry() {
		let state = authorized()
			.with_refresh_token_expires_at(NOW)
			.with_access_token_expires_at(NOW + Duration::hours(1));

		assert_eq!(state.freshness_at(NOW, BUFFER), Freshness::RefreshExpired);
		assert!(state.is_refresh_expired_at(NOW));
		assert!(!state.is_refresh_expired_at(NOW - Duration::seconds(1)));
	}

	#[test]
	fn unknown_access_expiry_is_not_refreshed() {
		assert_eq!(authorized().freshness_at(NOW, BUFFER), Freshness::UnknownExpiry);
	}

	#[test]
	fn buffer_boundary_is_inclusive() {
		let at_boundary = authorized().with_access_token_expires_at(NOW + BUFFER);
		let past_boundary =
			authorized().with_access_token_expires_at(NOW + BUFFER + Duration::seconds(1));

		assert_eq!(at_boundary.freshness_at(NOW, BUFFER), Freshness::Stale);
		assert_eq!(past_boundary.freshness_at(NOW, BUFFER), Freshness::Fresh);
	}

	#[test]
	fn negative_buffer_behaves_like_zero() {
		let state = authorized().with_access_token_expires_at(NOW + Duration::seconds(30));

		assert_eq!(state.freshness_at(NOW, Duration::minutes(-5)), Freshness::Fresh);
		assert_eq!(state.freshness_at(NOW + Duration::seconds(30), -BUFFER), Freshness::Stale);
	}

	#[test]
	fn serde_uses_extension_field_names() {
		let json = serde_json::to_value(authorized()).expect("Token state should serialize.");

		assert_eq!(json["accessToken"], "a");
		assert_eq!(json["refreshToken"], "r");
		assert!(json["accessTokenExpiresAt"].is_null());

		let back: AuthTokenState =
			serde_json::from_value(json).expect("Token state should deserialize.");

		assert_eq!(back, authorized());

		let stamped = authorized().with_access_token_expires_at(NOW);
		let json = serde_json::to_value(&stamped).expect("Token state should serialize.");

		assert_eq!(json["accessTokenExpiresAt"], 1_748_779_200_000_i64);
		assert_eq!(
			serde_json::from_value::<AuthTokenState>(json).expect("Epoch millis should parse."),
			stamped
		);

		let sparse: AuthTokenState =
			serde_json::from_str("{}").expect("Missing fields should default to absent.");

		assert_eq!(sparse, AuthTokenState::default());
	}

	#[test]
	fn extreme_buffers_classify_without_overflow() {
		let state = authorized().with_access_token_expires_at(NOW + Duration::hours(1));

		assert_eq!(state.freshness_at(NOW, Duration::days(365 * 20_000)), Freshness::Stale);
		assert_eq!(state.freshness_at(NOW, Duration::MAX), Freshness::Stale);
		assert_eq!(state.freshness_at(NOW, Duration::MIN), Freshness::Fresh);
	}

	#[test]
	fn expiries_accept_js_numbers() {
		let parsed: AuthTokenState = serde_json::from_value(serde_json::json!({
			"accessToken": "a",
			"refreshToken": "r",
			"accessTokenExpiresAt": 1_748_779_200_000.0_f64,
			"refreshTokenExpiresAt": 1_748_779_200_500_i64,
		}))
		.expect("Float and integer millis should both parse.");

		assert_eq!(parsed.access_token_expires_at, Some(NOW));
		assert_eq!(parsed.refresh_token_expires_at, Some(NOW + Duration::milliseconds(500)));
	}

	#[test]
	fn zero_expiry_is_absent() {
		let parsed: AuthTokenState = serde_json::from_value(serde_json::json!({
			"accessToken": "a",
			"refreshToken": "r",
			"accessTokenExpiresAt": 0,
			"refreshTokenExpiresAt": 0.0,
		}))
		.expect("Zero expiries should parse.");

		assert_eq!(parsed.access_token_expires_at, None);
		assert_eq!(parsed.refresh_token_expires_at, None);
		assert_eq!(parsed.freshness_at(NOW, BUFFER), Freshness::UnknownExpiry);
	}

	#[test]
	fn out_of_range_expiry_is_rejected() {
		serde_json::from_value::<AuthTokenState>(serde_json::json!({
			"accessTokenExpiresAt": 1e300,
		}))
		.expect_err("Instants past the supported range should be rejected.");
	}

	#[test]
	fn debug_redacts_tokens() {
		let rendered = format!("{:?}", authorized());

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("\"a\""));
	}
}
