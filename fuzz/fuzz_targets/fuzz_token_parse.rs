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

use authsel::auth::token::Token;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(token) = Token::parse(s) {
            // A token that parses must re-serialize to something that
            // parses back to an equal token.
            let reserialized = token.serialize();
            let reparsed = Token::parse(&reserialized).expect("reparse of own serialization");
            assert_eq!(reparsed, token);
        }
    }
});
