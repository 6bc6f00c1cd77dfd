// Library root
// -----------
// This crate exposes a small library surface for the `xlua` binary, a
// command-line client for the XPrivacyLua REST API running on a device.
//
// Module responsibilities:
// - `api`: Encapsulates HTTP interactions with the REST API (one method per
//   endpoint), the request payloads and the client error type.
// - `cli`: Declares the command-line interface and maps each subcommand to
//   a call on `api::ApiClient`, printing the JSON result.
// - `logger`: Installs the tracing subscriber used by the binary.
//
// Keeping the HTTP code apart from argument parsing lets the tests drive
// `ApiClient` directly against a mock server.
pub mod api;
pub mod cli;
pub mod logger;
