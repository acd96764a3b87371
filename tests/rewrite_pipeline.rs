//! End-to-end tests: TOML config → compiled settings → resolution and rewriting.

use std::sync::Arc;

use cdn_rewriter::config::loader::{parse_config, ConfigError};
use cdn_rewriter::mapping::PolicyError;
use cdn_rewriter::config::validation::ValidationError;
use cdn_rewriter::{FileUrlGenerator, HtmlRewriter, TokenSigner};

mod common;

const COMPLEX: &str = r#"
status = true

[mapping]
type = "complex"
fallback_domain = "f.example.com"

[[mapping.domains]]
type = "simple"
domain = "css.example.com"
conditions = { extensions = ["css"] }

[[mapping.domains]]
type = "auto-balanced"
domains = ["img1.example.com", "img2.example.com"]
conditions = { extensions = ["png", "jpg"] }
"#;

#[test]
fn test_complex_policy_resolution() {
    let settings = common::settings(COMPLEX);

    assert_eq!(settings.resolve("app.css").as_deref(), Some("css.example.com"));
    assert_eq!(settings.resolve("app.js").as_deref(), Some("f.example.com"));
    assert_eq!(settings.resolve("APP.CSS").as_deref(), Some("css.example.com"));
    assert_eq!(
        settings.domains(),
        vec![
            "css.example.com",
            "f.example.com",
            "img1.example.com",
            "img2.example.com"
        ]
    );
}

#[test]
fn test_balanced_resolution_is_stable() {
    let settings = common::settings(COMPLEX);

    let first = settings.resolve("sites/default/files/photo.jpg");
    for _ in 0..10 {
        assert_eq!(settings.resolve("sites/default/files/photo.jpg"), first);
    }
    // Only the basename takes part in the hash.
    assert_eq!(settings.resolve("other/dir/photo.jpg"), first);
}

#[test]
fn test_simple_policy_without_fallback() {
    let settings = common::settings(
        r#"
        status = true
        [mapping]
        type = "simple"
        domain = "cdn.example.com"
        conditions = { extensions = ["png", "jpg"] }
        "#,
    );

    assert_eq!(settings.resolve("foo.png").as_deref(), Some("cdn.example.com"));
    assert_eq!(settings.resolve("foo.txt"), None);
    assert_eq!(settings.resolve("README"), None);
}

#[test]
fn test_invalid_policies_are_rejected() {
    let err = parse_config(
        r#"
        [mapping]
        type = "auto-balanced"
        domains = ["a.example.com", "b.example.com"]
        "#,
    )
    .unwrap_err();
    match err {
        ConfigError::Validation(errors) => assert!(matches!(
            errors.as_slice(),
            [ValidationError::Policy(PolicyError::BalancingAllFiles)]
        )),
        other => panic!("unexpected error: {}", other),
    }

    let err = parse_config(
        r#"
        [mapping]
        type = "complex"
        [[mapping.domains]]
        type = "simple"
        domain = "a.example.com"
        conditions = { not = { extensions = ["css"] } }
        "#,
    )
    .unwrap_err();
    match err {
        ConfigError::Validation(errors) => assert!(matches!(
            errors.as_slice(),
            [ValidationError::Policy(PolicyError::NegatedConditions { index: 0 })]
        )),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_reload_swaps_whole_table() {
    let settings = common::settings(COMPLEX);
    let before = settings.snapshot();

    let version = settings
        .apply(
            parse_config(
                r#"
                status = true
                [mapping]
                type = "simple"
                domain = "new.example.com"
                "#,
            )
            .unwrap(),
        )
        .unwrap();

    assert_eq!(version, before.version + 1);
    assert_eq!(settings.resolve("app.css").as_deref(), Some("new.example.com"));
    assert_eq!(before.table.len(), 4);
}

#[test]
fn test_rewrite_document() {
    let settings = common::settings(COMPLEX);
    let rewriter = HtmlRewriter::default();
    let html = concat!(
        "<html><head><link rel=\"stylesheet\" href=\"/app.css\"></head><body>\n",
        "<a href=\"/files/doc.pdf\"><img src=\"/files/thumb.png\"></a>\n",
        "<a href=\"https://example.com/files/big.jpg\"><img src=\"/files/small.jpg\"></a>\n",
        "<img src=\"https://elsewhere.org/x.png\">\n",
        "</body></html>",
    );

    let out = rewriter.rewrite_with(html, &common::site(), &settings);

    let thumb = settings.resolve("/files/thumb.png").unwrap();
    let big = settings.resolve("/files/big.jpg").unwrap();
    let small = settings.resolve("/files/small.jpg").unwrap();
    let expected = format!(
        concat!(
            "<html><head><link rel=\"stylesheet\" href=\"/app.css\"></head><body>\n",
            "<a href=\"/files/doc.pdf\"><img src=\"//{}/files/thumb.png\"></a>\n",
            "<a href=\"//{}/files/big.jpg\"><img src=\"//{}/files/small.jpg\"></a>\n",
            "<img src=\"https://elsewhere.org/x.png\">\n",
            "</body></html>",
        ),
        thumb, big, small
    );
    assert_eq!(out, expected);

    // Rewriting the output again changes nothing.
    assert_eq!(rewriter.rewrite_with(&out, &common::site(), &settings), out);
}

#[test]
fn test_site_patterns_are_per_site() {
    let settings = common::settings(COMPLEX);
    let rewriter = HtmlRewriter::default();
    let a = cdn_rewriter::SiteIdentity::new("https", "a.example.org", "");
    let b = cdn_rewriter::SiteIdentity::new("https", "b.example.org", "");
    let html = r#"<img src="https://a.example.org/x.css">"#;

    let for_a = rewriter.rewrite_with(html, &a, &settings);
    let for_b = rewriter.rewrite_with(html, &b, &settings);

    assert_eq!(for_a, r#"<img src="//css.example.com/x.css">"#);
    assert_eq!(for_b, html);
    assert_eq!(rewriter.patterns().len(), 2);
}

#[test]
fn test_file_urls_with_farfuture() {
    let settings = common::settings(&format!(
        "{}\n[farfuture]\nstatus = true\nsecret = \"{}\"\n",
        COMPLEX,
        common::SECRET
    ));
    let generator = FileUrlGenerator::new(settings.clone(), Arc::new(common::LocalFiles));

    let url = generator.generate("public://app.css", &common::site()).unwrap();
    let token = TokenSigner::new(common::SECRET)
        .unwrap()
        .sign(common::MTIME, "public", "app.css");
    assert_eq!(
        url,
        format!("//css.example.com/cdn/ff/{}/{}/public/app.css", token, common::MTIME)
    );

    assert_eq!(
        generator.generate("core/misc/app.js", &common::site()).as_deref(),
        Some("//f.example.com/core/misc/app.js")
    );
}
