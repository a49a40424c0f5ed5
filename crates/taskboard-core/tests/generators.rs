#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use taskboard_core::model::{Priority, Status, Task};
use taskboard_core::outcome::{Maybe, Outcome};
use taskboard_core::timestamp::format_iso;

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

pub fn arb_status() -> impl Strategy<Value = Status> + Clone {
    prop_oneof![
        Just(Status::Todo),
        Just(Status::InProgress),
        Just(Status::Review),
        Just(Status::Done),
    ]
}

pub fn arb_priority() -> impl Strategy<Value = Priority> + Clone {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High),
        Just(Priority::Critical),
    ]
}

/// Seconds after [`base_time`], spread over roughly sixty days.
pub fn arb_stamp() -> impl Strategy<Value = String> + Clone {
    (0i64..5_184_000).prop_map(|secs| format_iso(base_time() + Duration::seconds(secs)))
}

pub fn arb_task() -> impl Strategy<Value = Task> + Clone {
    (
        "t[0-9]{1,3}",
        prop_oneof![Just("p1"), Just("p2")],
        "[A-Za-z ]{0,24}",
        arb_status(),
        arb_priority(),
        prop::option::of(prop_oneof![Just("u1"), Just("u2"), Just("u3")]),
        arb_stamp(),
    )
        .prop_map(
            |(id, project, title, status, priority, assignee, created)| Task {
                id,
                project_id: project.to_string(),
                title,
                desc: "generated".to_string(),
                status,
                priority,
                assignee: assignee.map(str::to_string),
                updated: created.clone(),
                created,
            },
        )
}

pub fn arb_tasks() -> impl Strategy<Value = Vec<Task>> + Clone {
    prop::collection::vec(arb_task(), 0..40)
}

pub fn arb_maybe() -> impl Strategy<Value = Maybe<i32>> + Clone {
    prop::option::of(any::<i32>()).prop_map(Maybe::from)
}

pub fn arb_outcome() -> impl Strategy<Value = Outcome<String, i32>> + Clone {
    prop_oneof![
        any::<i32>().prop_map(Outcome::Success),
        "[a-z]{1,8}".prop_map(Outcome::Failure),
    ]
}
