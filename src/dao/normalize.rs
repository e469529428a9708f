//! Total repair of raw persisted values into a valid [`WheelState`].
//!
//! Documents may come from older schema versions or hand-edited files, so
//! every field is extracted leniently and invalid entries are dropped rather
//! than surfaced as errors.

use serde_json::Value;

use crate::dao::models::{SpinAssignment, WheelOption, WheelState, current_time_ms};

/// Repair an arbitrary decoded value into a structurally valid document.
///
/// Never fails: completely malformed input yields the default document.
pub fn normalize(raw: &Value) -> WheelState {
    let Some(object) = raw.as_object() else {
        return WheelState::new_default();
    };

    let updated_at_ms = object
        .get("updated_at_ms")
        .and_then(as_i64_lenient)
        // Legacy documents carried `updated_at` in fractional seconds.
        .or_else(|| {
            object
                .get("updated_at")
                .and_then(Value::as_f64)
                .map(|seconds| (seconds * 1000.0) as i64)
        })
        .unwrap_or_else(current_time_ms);

    let options = object
        .get("options")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(normalize_option).collect())
        .unwrap_or_default();

    let assignments = object
        .get("assignments")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| normalize_assignment(entry, updated_at_ms))
                .collect()
        })
        .unwrap_or_default();

    let next_submission_seq = object
        .get("next_submission_seq")
        .and_then(as_u64_lenient)
        .unwrap_or(1);

    let spin_id = object
        .get("spin_id")
        .and_then(as_u64_lenient)
        .unwrap_or(0);

    repair(WheelState {
        options,
        assignments,
        next_submission_seq,
        spin_id,
        updated_at_ms,
    })
}

/// Re-establish the document invariants on an already-typed state.
///
/// Applied before every save so no invalid document is ever written.
pub fn repair(mut state: WheelState) -> WheelState {
    state.options.retain(|option| !option.name.trim().is_empty());
    for option in &mut state.options {
        option.limit = option.limit.max(1);
        option.remaining = option.remaining.min(option.limit);
    }

    state
        .assignments
        .retain(|assignment| !assignment.option_name.trim().is_empty());

    if state.next_submission_seq < 1 {
        state.next_submission_seq = 1;
    }

    state
}

fn normalize_option(entry: &Value) -> Option<WheelOption> {
    let object = entry.as_object()?;
    let name = object.get("name").and_then(Value::as_str)?.trim();
    if name.is_empty() {
        return None;
    }

    let limit = object
        .get("limit")
        .and_then(as_u64_lenient)
        .unwrap_or(1)
        .max(1) as u32;
    let remaining = object
        .get("remaining")
        .and_then(as_u64_lenient)
        .map(|value| (value as u32).min(limit))
        .unwrap_or(limit);

    Some(WheelOption {
        name: name.to_string(),
        description: object
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        limit,
        remaining,
    })
}

fn normalize_assignment(entry: &Value, fallback_assigned_ms: i64) -> Option<SpinAssignment> {
    let object = entry.as_object()?;
    let spin_id = object.get("spin_id").and_then(as_u64_lenient)?;
    let option_name = object
        .get("option_name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())?;

    let submission_seq = object
        .get("submission_seq")
        .and_then(as_u64_lenient)
        .filter(|seq| *seq > 0);

    Some(SpinAssignment {
        spin_id,
        option_name: option_name.to_string(),
        assigned_at_ms: object
            .get("assigned_at_ms")
            .and_then(as_i64_lenient)
            .unwrap_or(fallback_assigned_ms),
        team_name: object
            .get("team_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
        completed_at_ms: object.get("completed_at_ms").and_then(as_i64_lenient),
        submission_seq,
    })
}

fn as_i64_lenient(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|float| float as i64))
}

fn as_u64_lenient(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|float| *float >= 0.0).map(|float| float as u64))
}
