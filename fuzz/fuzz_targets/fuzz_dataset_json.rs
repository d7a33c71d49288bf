// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Dataset records must reject bad JSON without panicking

#![no_main]

use libfuzzer_sys::fuzz_target;
use repairbase::types::{
    Device, ErrorCodeEntry, EuPrices, IcRecord, KeyCombination, Measurement, PowerStation,
    RegionalCode, UkrainePrices,
};

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<Vec<Device>>(data);
    let _ = serde_json::from_slice::<UkrainePrices>(data);
    let _ = serde_json::from_slice::<EuPrices>(data);
    let _ = serde_json::from_slice::<Vec<IcRecord>>(data);
    let _ = serde_json::from_slice::<Vec<Measurement>>(data);
    let _ = serde_json::from_slice::<Vec<KeyCombination>>(data);
    let _ = serde_json::from_slice::<Vec<RegionalCode>>(data);
    let _ = serde_json::from_slice::<Vec<PowerStation>>(data);

    // Numeric and textual codes both come back as text
    if let Ok(codes) = serde_json::from_slice::<Vec<ErrorCodeEntry>>(data) {
        for code in codes {
            let _ = code.code.len();
        }
    }
});
