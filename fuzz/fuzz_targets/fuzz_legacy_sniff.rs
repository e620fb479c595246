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

use authsel::auth::group::legacy;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The detector must never panic, and whenever it claims a buffer is
    // legacy-encoded, the decoder must also not panic (it may still
    // legitimately reject malformed bodies past the header).
    if legacy::sniff(data) {
        let _ = legacy::decode(data);
    }
});
