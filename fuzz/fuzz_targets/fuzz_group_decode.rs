// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![no_main]
#![forbid(unsafe_code)]

use authsel::auth::group::decode_group;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // decode_group must never panic on arbitrary input, and any value it
    // accepts must survive an encode/decode round trip unchanged.
    if let Ok(group) = decode_group(data) {
        let encoded = authsel::auth::group::encode_group(&group).expect("re-encode");
        let reparsed = decode_group(&encoded).expect("reparse of own encoding");
        assert_eq!(reparsed, group);
    }
});
