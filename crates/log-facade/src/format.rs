//! Lazy message formatting
//!
//! Templates use `{}` as a positional placeholder. Rendering only happens once
//! a call has passed the level gate, so disabled calls never touch their
//! arguments' `Display` implementations.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{self, Display, Write};

const PLACEHOLDER: &str = "{}";
const ESCAPE: char = '\\';
const CAUSE_SEPARATOR: &str = ": caused by: ";

/// Arguments for a formatted log call.
///
/// The fixed-size shapes let the one- and two-argument entry points avoid
/// building a slice; every shape renders exactly like `Many` over the same
/// values.
#[derive(Clone, Copy, Default)]
pub enum Args<'a> {
    /// No arguments; the template is used verbatim
    #[default]
    None,
    /// A single argument
    One(&'a dyn Display),
    /// Two arguments
    Two(&'a dyn Display, &'a dyn Display),
    /// Any number of arguments
    Many(&'a [&'a dyn Display]),
}

impl<'a> Args<'a> {
    /// Number of arguments.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::One(_) => 1,
            Self::Two(..) => 2,
            Self::Many(args) => args.len(),
        }
    }

    /// Whether there are no arguments.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The argument at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a dyn Display> {
        match (*self, index) {
            (Self::One(a), 0) | (Self::Two(a, _), 0) => Some(a),
            (Self::Two(_, b), 1) => Some(b),
            (Self::Many(args), i) => args.get(i).copied(),
            _ => None,
        }
    }
}

impl fmt::Debug for Args<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for index in 0..self.len() {
            if let Some(arg) = self.get(index) {
                list.entry(&format_args!("{arg}"));
            }
        }
        list.finish()
    }
}

/// Render `template`, substituting `args` into `{}` placeholders left to right.
///
/// Placeholders beyond the supplied arguments are kept literally and excess
/// arguments are ignored. `\{}` yields a literal `{}` without consuming an
/// argument, and `\\{}` yields a backslash followed by the argument. Escapes
/// apply across the whole template, including after the arguments run out.
/// With no arguments the template is returned unchanged.
#[must_use]
pub fn render<'t>(template: &'t str, args: Args<'_>) -> Cow<'t, str> {
    if args.is_empty() {
        return Cow::Borrowed(template);
    }

    let mut out = String::with_capacity(template.len() + 8 * args.len());
    let mut rest = template;
    let mut next = 0;

    while let Some(pos) = rest.find(PLACEHOLDER) {
        let before = &rest[..pos];
        rest = &rest[pos + PLACEHOLDER.len()..];

        if let Some(unescaped) = before.strip_suffix(ESCAPE) {
            out.push_str(unescaped);
            if !unescaped.ends_with(ESCAPE) {
                out.push_str(PLACEHOLDER);
                continue;
            }
            // Escaped backslash; the placeholder is live.
        } else {
            out.push_str(before);
        }

        match args.get(next) {
            Some(arg) => {
                let _ = write!(out, "{arg}");
            }
            None => out.push_str(PLACEHOLDER),
        }
        next += 1;
    }

    out.push_str(rest);
    Cow::Owned(out)
}

/// Render an error and its `source()` chain on a single line.
#[must_use]
pub fn render_error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(CAUSE_SEPARATOR);
        let _ = write!(out, "{cause}");
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fills_placeholders_in_order() {
        let (a, b) = (1, "two");
        assert_eq!(render("{} and {}", Args::Two(&a, &b)), "1 and two");
        assert_eq!(render("x={}", Args::One(&5)), "x=5");
    }

    #[test]
    fn test_missing_arguments_keep_placeholders() {
        assert_eq!(render("{} {} {}", Args::One(&"a")), "a {} {}");
    }

    #[test]
    fn test_excess_arguments_are_ignored() {
        let args: [&dyn Display; 3] = [&1, &2, &3];
        assert_eq!(render("only {}", Args::Many(&args)), "only 1");
        assert_eq!(render("none", Args::Many(&args)), "none");
    }

    #[test]
    fn test_message_only_is_verbatim() {
        assert_eq!(render("literal {} and \\{}", Args::None), "literal {} and \\{}");
        assert!(matches!(render("borrowed", Args::None), Cow::Borrowed(_)));
        assert_eq!(render("{}", Args::Many(&[])), "{}");
    }

    #[test]
    fn test_escaped_placeholder() {
        assert_eq!(render("set \\{} to {}", Args::One(&7)), "set {} to 7");
        assert_eq!(render("path C:\\\\{}", Args::One(&"tmp")), "path C:\\tmp");
    }

    #[test]
    fn test_escapes_after_arguments_run_out() {
        assert_eq!(render("{} \\{}", Args::One(&1)), "1 {}");
        assert_eq!(render("{} \\{} {}", Args::One(&1)), "1 {} {}");
        assert_eq!(render("{} C:\\\\{}", Args::One(&1)), "1 C:\\{}");
    }

    #[test]
    fn test_multibyte_template() {
        assert_eq!(render("état={} ✓", Args::One(&"ok")), "état=ok ✓");
    }

    #[test]
    fn test_failing_display_contributes_nothing() {
        struct Broken;
        impl Display for Broken {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                Err(fmt::Error)
            }
        }
        assert_eq!(render("[{}] {}", Args::Two(&Broken, &1)), "[] 1");
    }

    #[test]
    fn test_error_chain() {
        #[derive(Debug)]
        struct Inner;
        impl Display for Inner {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("disk full")
            }
        }
        impl StdError for Inner {}

        #[derive(Debug)]
        struct Outer(Inner);
        impl Display for Outer {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("write failed")
            }
        }
        impl StdError for Outer {
            fn source(&self) -> Option<&(dyn StdError + 'static)> {
                Some(&self.0)
            }
        }

        assert_eq!(
            render_error_chain(&Outer(Inner)),
            "write failed: caused by: disk full"
        );
        assert_eq!(render_error_chain(&Inner), "disk full");
    }

    #[test]
    fn test_args_debug_lists_values() {
        assert_eq!(format!("{:?}", Args::Two(&1, &"x")), "[1, x]");
        assert_eq!(format!("{:?}", Args::None), "[]");
    }

    fn template() -> impl Strategy<Value = String> {
        proptest::collection::vec(
            prop_oneof![
                Just("{}".to_string()),
                Just("\\{}".to_string()),
                Just("\\\\{}".to_string()),
                Just("{".to_string()),
                Just("}".to_string()),
                "[a-z =]{0,6}",
            ],
            0..8,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn prop_fixed_shapes_match_variadic(
            template in template(),
            values in proptest::collection::vec("[a-z0-9{}\\\\]{0,4}", 0..=2),
        ) {
            let many: Vec<&dyn Display> = values.iter().map(|v| v as &dyn Display).collect();
            let fixed = match values.as_slice() {
                [] => render(&template, Args::None),
                [a] => render(&template, Args::One(a)),
                [a, b] => render(&template, Args::Two(a, b)),
                _ => unreachable!(),
            };
            prop_assert_eq!(fixed, render(&template, Args::Many(&many)));
        }

        #[test]
        fn prop_never_panics(
            template in ".{0,32}",
            values in proptest::collection::vec(".{0,8}", 0..6),
        ) {
            let many: Vec<&dyn Display> = values.iter().map(|v| v as &dyn Display).collect();
            let _ = render(&template, Args::Many(&many));
        }
    }
}
