//! Single-page extraction: copy one page and everything it transitively references into a
//! standalone, self-contained PDF byte stream.
//!
//! Walks the catalog's page tree to locate the target page the way
//! [`crate::document::PdfDocument::get_page_ref_recursive`] does, then computes the transitive
//! closure of objects the page dictionary reaches (content streams, `/Resources` and everything
//! it names, soft masks, CMaps), renumbers that closure to a contiguous range via
//! [`crate::registry::PdfObjectRegistry::rebuild_object_numbers`], rewrites every reference inside
//! the cloned values through the renumbering map, and synthesizes a minimal `/Pages` root around
//! the single relocated page before handing the result to [`crate::serializer::write_document`].

use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::object::{Dict, Object, ObjectNode, ObjectRef};
use crate::registry::PdfObjectRegistry;
use crate::serializer::{write_document, NumberedObject};
use std::collections::HashMap;

/// Extract `page_number` (1-based) from `doc` as a standalone PDF document's bytes.
pub fn extract_page(doc: &mut PdfDocument, page_number: usize) -> Result<Vec<u8>> {
    if page_number == 0 {
        return Err(Error::InvalidPdf("page numbers are 1-based".to_string()));
    }
    let page_index = page_number - 1;
    let page_ref = doc.get_page_ref(page_index)?;

    let mut closure: HashMap<ObjectRef, Object> = HashMap::new();
    collect_closure(doc, page_ref, &mut closure)?;

    // Renumber the closure to a contiguous 1..=N range via the registry's own renumbering
    // operation, rather than a hand-rolled counter; the Pages root and Catalog take the next two
    // numbers above whatever the closure compacted to.
    let local_registry = PdfObjectRegistry::default();
    let mut refs: Vec<ObjectRef> = closure.keys().copied().collect();
    refs.sort_by_key(|r| (r.id, r.gen));
    for old_ref in &refs {
        local_registry.register(ObjectNode::in_memory(old_ref.id, old_ref.gen, closure[old_ref].clone()));
    }
    let translation = local_registry.rebuild_object_numbers();

    let media_box = find_media_box(doc, page_ref)?;

    let mut numbered = Vec::with_capacity(refs.len() + 2);
    for old_ref in &refs {
        let new_ref = translation[old_ref];
        let value = rewrite_refs(&closure[old_ref], &translation);
        numbered.push(NumberedObject { id: new_ref.id, gen: new_ref.gen, value });
    }

    let new_page_ref = translation[&page_ref];
    let mut pages_dict = Dict::new();
    pages_dict.insert("Type".to_string(), Object::Name("Pages".to_string()));
    pages_dict.insert("Kids".to_string(), Object::Array(vec![Object::Reference(new_page_ref)]));
    pages_dict.insert("Count".to_string(), Object::Integer(1));
    pages_dict.insert("MediaBox".to_string(), media_box);
    let pages_root_ref = ObjectRef::new(local_registry.get_next_object_number(), 0);
    numbered.push(NumberedObject {
        id: pages_root_ref.id,
        gen: 0,
        value: Object::Dictionary(pages_dict),
    });

    // Relink the relocated page to the synthesized Pages root and drop any stray /Parent it had
    // pointing at a page-tree node that was never copied.
    if let Some(NumberedObject { value: Object::Dictionary(page_dict), .. }) =
        numbered.iter_mut().find(|n| n.id == new_page_ref.id)
    {
        page_dict.insert("Parent".to_string(), Object::Reference(pages_root_ref));
    }

    let mut catalog_dict = Dict::new();
    catalog_dict.insert("Type".to_string(), Object::Name("Catalog".to_string()));
    catalog_dict.insert("Pages".to_string(), Object::Reference(pages_root_ref));
    let catalog_ref = ObjectRef::new(pages_root_ref.id + 1, 0);
    numbered.push(NumberedObject { id: catalog_ref.id, gen: 0, value: Object::Dictionary(catalog_dict) });

    Ok(write_document(doc.version(), &numbered, catalog_ref, None))
}

/// Walk `node_ref`'s reachable objects, loading each exactly once and stopping at page-tree
/// ancestors (`/Parent`) so the closure does not drag in sibling pages.
fn collect_closure(
    doc: &mut PdfDocument,
    node_ref: ObjectRef,
    seen: &mut HashMap<ObjectRef, Object>,
) -> Result<()> {
    if seen.contains_key(&node_ref) {
        return Ok(());
    }
    let value = doc.load_object(node_ref)?;
    seen.insert(node_ref, value.clone());
    walk_references(doc, &value, seen)
}

fn walk_references(
    doc: &mut PdfDocument,
    value: &Object,
    seen: &mut HashMap<ObjectRef, Object>,
) -> Result<()> {
    match value {
        Object::Reference(r) => collect_closure(doc, *r, seen),
        Object::Array(items) => {
            for item in items {
                walk_references(doc, item, seen)?;
            }
            Ok(())
        },
        Object::Dictionary(dict) => {
            for (key, val) in dict.iter() {
                if key == "Parent" {
                    continue;
                }
                walk_references(doc, val, seen)?;
            }
            Ok(())
        },
        Object::Stream { dict, .. } => {
            for (key, val) in dict.iter() {
                if key == "Parent" {
                    continue;
                }
                walk_references(doc, val, seen)?;
            }
            Ok(())
        },
        _ => Ok(()),
    }
}

/// Rewrite every `Object::Reference` inside `value` through `translation`. References that
/// point outside the closure (should not happen for a correctly computed closure) are left
/// untouched rather than produced as dangling, since dropping them silently would be worse.
fn rewrite_refs(value: &Object, translation: &HashMap<ObjectRef, ObjectRef>) -> Object {
    match value {
        Object::Reference(r) => match translation.get(r) {
            Some(new_ref) => Object::Reference(*new_ref),
            None => Object::Reference(*r),
        },
        Object::Array(items) => {
            Object::Array(items.iter().map(|item| rewrite_refs(item, translation)).collect())
        },
        Object::Dictionary(dict) => {
            let mut new_dict = Dict::new();
            for (key, val) in dict.iter() {
                new_dict.insert(key.clone(), rewrite_refs(val, translation));
            }
            Object::Dictionary(new_dict)
        },
        Object::Stream { dict, data } => {
            let mut new_dict = Dict::new();
            for (key, val) in dict.iter() {
                new_dict.insert(key.clone(), rewrite_refs(val, translation));
            }
            Object::Stream { dict: new_dict, data: data.clone() }
        },
        other => other.clone(),
    }
}

/// Find the effective `/MediaBox` for `page_ref`, walking up `/Parent` as the spec's inheritance
/// rule requires, falling back to US Letter if none is found anywhere in the ancestry.
fn find_media_box(doc: &mut PdfDocument, page_ref: ObjectRef) -> Result<Object> {
    let mut current = page_ref;
    let mut guard = 0;
    loop {
        guard += 1;
        if guard > 64 {
            break;
        }
        let node = doc.load_object(current)?;
        let dict = match node.as_dict() {
            Some(d) => d,
            None => break,
        };
        if let Some(mb) = dict.get("MediaBox") {
            return Ok(mb.clone());
        }
        match dict.get("Parent").and_then(|p| p.as_reference()) {
            Some(parent_ref) => current = parent_ref,
            None => break,
        }
    }
    Ok(Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ]))
}
