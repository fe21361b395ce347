use anyhow::Result;
use std::path::PathBuf;

use sitepack::{aggregate, CollisionWarning, DescriptorSource, LoadError};

mod common;
use common::{entries, page, MemorySource};

#[test]
fn home_and_contact_pages() -> Result<()> {
    let source = MemorySource::new()
        .with("home.page.ts", page("Home", "index.html", &["index"], &[]))
        .with(
            "contacts.page.ts",
            page(
                "Contact",
                "contacts/index.html",
                &["index"],
                &[("contacts/contact-us", "contacts.ts")],
            ),
        );
    let paths = source.discover()?;
    let base = entries(&[("index", "src/index.ts")]);

    let result = aggregate(&source, &paths, &base)?;

    assert_eq!(
        entries(&[
            ("index", "src/index.ts"),
            ("contacts/contact-us", "contacts.ts")
        ]),
        result.entries
    );
    assert_eq!(2, result.emissions.len());
    assert_eq!("index.html", result.emissions[0].filename);
    assert_eq!(vec!["index"], result.emissions[0].chunks);
    assert_eq!("contacts/index.html", result.emissions[1].filename);
    assert_eq!(
        vec!["index", "contacts/contact-us"],
        result.emissions[1].chunks
    );
    assert_eq!("Contact", result.emissions[1].title);
    assert_eq!("contact.twig", result.emissions[1].template);
    assert!(result.collisions.is_empty());
    Ok(())
}

#[test]
fn disjoint_entries_are_all_kept() -> Result<()> {
    let source = MemorySource::new()
        .with("a", page("A", "a.html", &[], &[("a1", "a1.ts"), ("a2", "a2.ts")]))
        .with("b", page("B", "b.html", &[], &[("b1", "b1.ts")]))
        .with("c", page("C", "c.html", &[], &[]));
    let paths = source.discover()?;
    let base = entries(&[("index", "src/index.ts"), ("vendor", "vendor.ts")]);

    let result = aggregate(&source, &paths, &base)?;

    assert_eq!(
        vec!["index", "vendor", "a1", "a2", "b1"],
        result.entries.names().collect::<Vec<_>>()
    );
    for (name, path) in base.iter() {
        assert_eq!(Some(&path[..]), result.entries.get(name));
    }
    Ok(())
}

#[test]
fn chunk_order_is_declared_then_entries() -> Result<()> {
    let source = MemorySource::new().with(
        "a",
        page(
            "A",
            "a.html",
            &["vendor", "index"],
            &[("zeta", "z.ts"), ("alpha", "a.ts")],
        ),
    );
    let paths = source.discover()?;

    let result = aggregate(&source, &paths, &entries(&[]))?;

    assert_eq!(
        vec!["vendor", "index", "zeta", "alpha"],
        result.emissions[0].chunks
    );
    Ok(())
}

#[test]
fn last_processed_entry_wins() -> Result<()> {
    let source = MemorySource::new()
        .with("first", page("First", "first.html", &[], &[("shared", "first.ts")]))
        .with("second", page("Second", "second.html", &[], &[("shared", "second.ts")]));
    let paths = source.discover()?;

    let result = aggregate(&source, &paths, &entries(&[]))?;
    assert_eq!(Some("second.ts"), result.entries.get("shared"));
    assert_eq!(
        vec![CollisionWarning::Entry {
            name: "shared".to_string(),
            previous: "first.ts".to_string(),
            replacement: "second.ts".to_string(),
            descriptor: PathBuf::from("second"),
        }],
        result.collisions
    );

    // Reversing the discovery order reverses the winner.
    let reversed = paths.iter().rev().cloned().collect::<Vec<_>>();
    let result = aggregate(&source, &reversed, &entries(&[]))?;
    assert_eq!(Some("first.ts"), result.entries.get("shared"));
    Ok(())
}

#[test]
fn base_entry_can_be_overwritten() -> Result<()> {
    let source = MemorySource::new()
        .with("a", page("A", "a.html", &["index"], &[("index", "alt.ts")]));
    let paths = source.discover()?;

    let result =
        aggregate(&source, &paths, &entries(&[("index", "src/index.ts")]))?;
    assert_eq!(Some("alt.ts"), result.entries.get("index"));
    assert_eq!(1, result.entries.len());
    assert_eq!(vec!["index", "index"], result.emissions[0].chunks);
    assert_eq!(1, result.collisions.len());
    Ok(())
}

#[test]
fn duplicate_filenames_are_reported() -> Result<()> {
    let source = MemorySource::new()
        .with("a", page("A", "index.html", &[], &[]))
        .with("b", page("B", "index.html", &[], &[]));
    let paths = source.discover()?;

    let result = aggregate(&source, &paths, &entries(&[]))?;
    assert_eq!(2, result.emissions.len());
    assert_eq!(
        vec![CollisionWarning::Filename {
            filename: "index.html".to_string(),
            previous: PathBuf::from("a"),
            descriptor: PathBuf::from("b"),
        }],
        result.collisions
    );
    Ok(())
}

#[test]
fn no_descriptors() -> Result<()> {
    let source = MemorySource::new();
    let base = entries(&[("index", "src/index.ts")]);
    let paths: Vec<PathBuf> = Vec::new();

    let result = aggregate(&source, &paths, &base)?;
    assert_eq!(base, result.entries);
    assert!(result.emissions.is_empty());
    assert!(result.collisions.is_empty());
    Ok(())
}

#[test]
fn load_failure_aborts() -> Result<()> {
    let source = MemorySource::new()
        .with("a", page("A", "a.html", &[], &[("a", "a.ts")]))
        .broken("b")
        .with("c", page("C", "c.html", &[], &[]));
    let paths = source.discover()?;

    let err = aggregate(&source, &paths, &entries(&[])).unwrap_err();
    match err {
        LoadError::Invalid { path, message } => {
            assert_eq!(PathBuf::from("b"), path);
            assert!(message.contains("title"));
        }
        _ => panic!("unexpected error {:?}", err),
    }
    // Loading stops at the failing descriptor.
    assert_eq!(
        vec![PathBuf::from("a"), PathBuf::from("b")],
        *source.loads.borrow()
    );
    Ok(())
}

#[test]
fn aggregation_is_repeatable() -> Result<()> {
    let source = MemorySource::new()
        .with("a", page("A", "a.html", &["index"], &[("x", "x.ts")]))
        .with("b", page("B", "b.html", &["index"], &[("x", "y.ts"), ("z", "z.ts")]));
    let paths = source.discover()?;
    let base = entries(&[("index", "src/index.ts")]);

    let first = aggregate(&source, &paths, &base)?;
    let second = aggregate(&source, &paths, &base)?;
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.entries)?,
        serde_json::to_string(&second.entries)?
    );
    assert_eq!(
        serde_json::to_string(&first.emissions)?,
        serde_json::to_string(&second.emissions)?
    );
    Ok(())
}
