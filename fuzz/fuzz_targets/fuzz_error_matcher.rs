// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error matching and log bounds on arbitrary messages

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use repairbase::healer::{ErrorContext, ErrorLog, ErrorMatcher};

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    messages: Vec<(String, Vec<String>)>,
}

fuzz_target!(|input: Input| {
    let matcher = ErrorMatcher::builtin();
    let capacity = usize::from(input.capacity);
    let mut log = ErrorLog::with_capacity(capacity);

    for (message, stack) in input.messages {
        let direct = matcher.find_fix(&message).cloned();
        let recorded = log.record(&matcher, &message, stack.clone(), ErrorContext::new("fuzz", None));
        // Without causes only the message itself is matched
        if stack.is_empty() {
            assert_eq!(direct, recorded);
        }
        assert!(log.len() <= capacity);
    }
});
