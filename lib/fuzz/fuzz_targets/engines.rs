#![no_main]
use libfuzzer_sys::fuzz_target;

use linre::re::engine::{search_with, Cache, EngineKind, Input};
use linre::Regex;

// The input is a pattern and a haystack separated by a NUL byte. Every
// engine that can run the pattern must agree with the Pike VM.
fuzz_target!(|data: &[u8]| {
    let Ok(data) = std::str::from_utf8(data) else { return };
    let Some((pattern, haystack)) = data.split_once('\0') else { return };
    let Ok(re) = Regex::new(pattern) else { return };

    let mut cache = Cache::new();
    let input = Input::new(haystack);
    let expected =
        search_with(EngineKind::PikeVM, re.program(), &mut cache, &input);

    for kind in
        [EngineKind::Literal, EngineKind::OnePass, EngineKind::Backtrack]
    {
        assert_eq!(
            expected,
            search_with(kind, re.program(), &mut cache, &input),
            "{:?} disagrees with the Pike VM",
            kind
        );
    }
});
