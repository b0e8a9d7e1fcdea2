//! Fuzz target for processing context decoding.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_context_decode -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;
use xavyo_saml_session::AuthenticationContext;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(context) = AuthenticationContext::decode(s) {
            let encoded = context.encode().unwrap();
            assert_eq!(AuthenticationContext::decode(&encoded).unwrap(), context);
        }
    }
});
