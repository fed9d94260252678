// Library root
// -----------
// The binary (`main.rs`) wires these modules into the interactive helper
// that provisions a Supabase project and writes its client credentials.
//
// Module responsibilities:
// - `api`: blocking calls to the management API (organizations, project
//   creation, API keys) behind the `ManagementApi` trait.
// - `ui`: the `UserInterface` trait and its terminal implementation.
// - `setup`: the menu and the create -> wait -> fetch key -> write sequence.
// - `envfile`: renders and saves `.env.local`, asking before overwriting.
// - `region`: the numbered region list and its lenient parser.
// - `config`: settings read from `SUPABASE_*` environment variables.
pub mod api;
pub mod config;
pub mod envfile;
pub mod region;
pub mod setup;
pub mod ui;
