//! Burn page annotations into a PDF
//!
//! Uses `lopdf` to load the source document, append annotation objects to
//! the `/Annots` array of each annotated page and serialise the result.
//! Pages without annotations are left untouched.

use lopdf::{Document, Object, ObjectId};

use crate::annotations::{PageAnnotations, PageNumber};

use super::objects::{highlight_annotation, text_annotation};

/// Load a PDF from memory, working around documents that are flagged as
/// encrypted without actually being encrypted.
pub fn load_document(bytes: &[u8]) -> lopdf::Result<Document> {
    let mut doc = Document::load_mem(bytes)?;
    if clear_false_encryption(&mut doc) {
        tracing::debug!("Ignoring encryption flag and flattening streams");
    }
    Ok(doc)
}

/// Drop the `/Encrypt` trailer entry and decompress every stream.
///
/// Returns whether the document was flagged as encrypted.
pub fn clear_false_encryption(doc: &mut Document) -> bool {
    if doc.trailer.remove(b"Encrypt").is_none() {
        return false;
    }
    doc.decompress();
    true
}

/// Add every annotation in `pages` to the matching page of `doc`.
///
/// Returns the number of annotation objects added.
pub fn annotate(doc: &mut Document, pages: &PageAnnotations) -> lopdf::Result<usize> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    if let Some((last, _)) = pages.last_key_value() {
        if last.index() >= page_ids.len() {
            tracing::warn!(
                "Annotations on page {} but the document has only {} pages; ignoring them",
                last,
                page_ids.len()
            );
        }
    }

    let mut added = 0;
    for (index, page_id) in page_ids.into_iter().enumerate() {
        let Some(bag) = pages.get(&PageNumber::from_index(index)) else {
            continue;
        };

        for highlight in &bag.highlights {
            let annot = doc.add_object(highlight_annotation(highlight));
            attach_annotation(doc, page_id, annot)?;
            added += 1;
        }
        for note in &bag.notes {
            let annot = doc.add_object(text_annotation(note));
            attach_annotation(doc, page_id, annot)?;
            added += 1;
        }
    }

    Ok(added)
}

/// Append an annotation reference to a page's `/Annots` array, which may be
/// missing, inline, or an indirect object.
fn attach_annotation(doc: &mut Document, page_id: ObjectId, annot: ObjectId) -> lopdf::Result<()> {
    let existing = doc.get_object(page_id)?.as_dict()?.get(b"Annots").ok().cloned();

    match existing {
        Some(Object::Reference(array_id)) => {
            doc.get_object_mut(array_id)?
                .as_array_mut()?
                .push(Object::Reference(annot));
        }
        Some(Object::Array(_)) => {
            doc.get_object_mut(page_id)?
                .as_dict_mut()?
                .get_mut(b"Annots")?
                .as_array_mut()?
                .push(Object::Reference(annot));
        }
        _ => {
            doc.get_object_mut(page_id)?
                .as_dict_mut()?
                .set("Annots", Object::Array(vec![Object::Reference(annot)]));
        }
    }

    Ok(())
}

/// Annotate a PDF held in memory and serialise the result.
///
/// Returns the new file contents and the number of annotations added.
pub fn annotate_bytes(source: &[u8], pages: &PageAnnotations) -> lopdf::Result<(Vec<u8>, usize)> {
    let mut doc = load_document(source)?;
    let added = annotate(&mut doc, pages)?;

    let mut buffer = Vec::with_capacity(source.len());
    doc.save_to(&mut buffer)?;
    Ok((buffer, added))
}
