// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Extension traits over third-party types used by the token and API clients
// role: module/aggregation
// outputs: serde_json::Value dotted-path access (JsonFetch) for IMS, discovery and OAuth responses
// invariants: No side effects; pure extensions only
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod serde_json;
