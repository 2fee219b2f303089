use crate::decl::errors::DeclError;
use crate::decl::{consume_line_end, rewind_to_line_start};
use crate::decl::implements::remove_interface_from_implements;
use crate::decl::imports::remove_import_specifier;
use crate::edit::{apply_edits, Rewrite, TextEdit};
use crate::pool::with_parser;
use crate::tree::{find_all_by_kind, flatten};
use tracing::{debug, info};

/// Remove an empty lifecycle method and clean up after it.
///
/// A method whose block body holds zero statements is removed together with
/// the whitespace that belongs only to it. The matching lifecycle interface
/// (the method name with its leading `ng` stripped) is then dropped from the
/// implements clause and from the `lifecycle_package` import of the
/// re-parsed result. A method with a non-empty body is left untouched.
pub fn remove_empty_method(
    source: &str,
    method: &str,
    lifecycle_package: &str,
) -> Result<Rewrite, DeclError> {
    let parsed = with_parser(|p| p.parse_strict(source))??;
    let nodes = flatten(parsed.root_node());

    let target = find_all_by_kind(&nodes, "method_definition")
        .into_iter()
        .find(|m| {
            m.child_by_field_name("name")
                .is_some_and(|n| &source[n.byte_range()] == method)
        });

    let Some(target) = target else {
        info!(method, "no method declaration found, skipping");
        return Ok(Rewrite::Unchanged);
    };

    let body = target
        .child_by_field_name("body")
        .ok_or(DeclError::MissingConstruct {
            construct: "method block body",
        })?;

    let statements = (0..body.named_child_count())
        .filter_map(|i| body.named_child(i))
        .filter(|c| c.kind() != "comment")
        .count();
    if statements > 0 {
        info!(method, "method body is not empty, skipping");
        return Ok(Rewrite::Unchanged);
    }

    let start = rewind_to_line_start(source, target.start_byte());
    let end = consume_line_end(source, target.end_byte());
    debug!(method, start, end, "removing empty method");
    let without_method = apply_edits(source, &[TextEdit::delete(start, end)])?;

    // Follow-up edits re-parse the intermediate buffer; spans are never
    // reused across rewrites.
    let interface = method.strip_prefix("ng").unwrap_or(method);
    let without_impl =
        remove_interface_from_implements(&without_method, interface)?.into_source(&without_method);
    let cleaned = remove_import_specifier(&without_impl, lifecycle_package, Some(interface))?
        .into_source(&without_impl);

    Ok(Rewrite::Changed(cleaned))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = r#"import { Component, OnInit } from '@angular/core';

@Component({
  selector: 'app-root',
})
export class AppComponent implements OnInit {
  title = 'demo';

  ngOnInit() { }
}
"#;

    #[test]
    fn removes_method_interface_and_import() {
        let out = remove_empty_method(COMPONENT, "ngOnInit", "@angular/core").unwrap();
        let cleaned = out.into_changed().unwrap();

        assert!(!cleaned.contains("ngOnInit"));
        assert!(!cleaned.contains("OnInit"));
        assert!(!cleaned.contains("implements"));
        assert!(cleaned.contains("import { Component } from '@angular/core';"));
        assert!(cleaned.contains("export class AppComponent {"));
        assert!(cleaned.contains("title = 'demo';"));
    }

    #[test]
    fn non_empty_body_is_untouched() {
        let source = r#"import { OnInit } from '@angular/core';

export class AppComponent implements OnInit {
  ngOnInit() { this.load(); }

  load() { }
}
"#;
        let out = remove_empty_method(source, "ngOnInit", "@angular/core").unwrap();
        assert_eq!(out, Rewrite::Unchanged);
    }

    #[test]
    fn second_run_is_a_noop() {
        let once = remove_empty_method(COMPONENT, "ngOnInit", "@angular/core")
            .unwrap()
            .into_changed()
            .unwrap();
        let twice = remove_empty_method(&once, "ngOnInit", "@angular/core").unwrap();
        assert_eq!(twice, Rewrite::Unchanged);
    }

    #[test]
    fn absent_method_is_noop() {
        let out = remove_empty_method(COMPONENT, "ngOnDestroy", "@angular/core").unwrap();
        assert_eq!(out, Rewrite::Unchanged);
    }

    #[test]
    fn multiline_empty_body_is_removed() {
        let source = r#"export class AppComponent implements OnInit {
  ngOnInit() {
  }
}
"#;
        let out = remove_empty_method(source, "ngOnInit", "@angular/core").unwrap();
        assert_eq!(
            out.into_changed().unwrap(),
            "export class AppComponent {\n}\n"
        );
    }

    #[test]
    fn other_members_keep_their_spacing() {
        let source = r#"export class AppComponent implements OnDestroy {
  ngOnInit() { }

  ngOnDestroy() { this.sub.unsubscribe(); }
}
"#;
        let out = remove_empty_method(source, "ngOnInit", "@angular/core").unwrap();
        let cleaned = out.into_changed().unwrap();
        assert_eq!(
            cleaned,
            "export class AppComponent implements OnDestroy {\n\n  ngOnDestroy() { this.sub.unsubscribe(); }\n}\n"
        );
    }
}
