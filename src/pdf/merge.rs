//! PDF merging functionality using lopdf

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{info, warn};
use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::scan::collect_pdfs;
use super::cover::{create_cover_pdf, CoverOptions};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Result of merging a directory tree
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    Merged {
        path: PathBuf,
        /// Per-folder PDFs included, in order (the cover is not listed)
        inputs: Vec<PathBuf>,
        pages: usize,
    },
    /// No qualifying PDFs were found; nothing was written
    NothingToMerge,
}

/// Load a merge input, or explain why it is unusable
fn load_input(path: &Path) -> Result<Document> {
    let doc = Document::load(path)?;
    if doc.get_pages().is_empty() {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }
    Ok(doc)
}

/// Path of the master PDF for `root`
pub fn master_path(root: &Path, master_prefix: &str, title: &str) -> PathBuf {
    root.join(format!("{} {} Master PDF.pdf", master_prefix, title))
}

/// Title used for the master PDF: configured, else the root folder name
pub fn master_title(root: &Path, config: &ReportConfig) -> String {
    config.master_title.clone().unwrap_or_else(|| {
        root.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Photos".to_string())
    })
}

/// Merge every report PDF under `root` into the master PDF.
///
/// Files whose name starts with the master prefix are never inputs, so
/// re-running does not fold an old master into the new one. Inputs that
/// cannot be loaded are skipped with a warning. With `cover_page` set, a
/// cover is rendered to a temporary file in `root` and removed again
/// whether or not the merge succeeds.
pub fn merge_tree(root: &Path, config: &ReportConfig) -> Result<MergeOutcome> {
    let candidates = collect_pdfs(root, &config.master_prefix)?;

    let mut inputs = Vec::new();
    let mut documents = Vec::new();
    for path in candidates {
        match load_input(&path) {
            Ok(doc) => {
                documents.push(doc);
                inputs.push(path);
            }
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    if documents.is_empty() {
        info!("No PDFs found to merge under {}", root.display());
        return Ok(MergeOutcome::NothingToMerge);
    }

    let title = master_title(root, config);
    let output = master_path(root, &config.master_prefix, &title);

    // Dropping the temp file deletes it, on every return path below.
    let cover_file = if config.cover_page {
        let file = tempfile::Builder::new()
            .prefix(&format!("{} cover ", config.master_prefix))
            .suffix(".pdf")
            .tempfile_in(root)?;
        let cover = CoverOptions {
            title: title.clone(),
            entries: inputs
                .iter()
                .map(|p| p.file_name().unwrap_or_default().to_string_lossy().into_owned())
                .collect(),
            page: config.page_size.dimensions(),
            logo: config.logo_path.clone(),
        };
        create_cover_pdf(file.path(), &cover)?;
        documents.insert(0, Document::load(file.path())?);
        Some(file)
    } else {
        None
    };

    let pages = write_merged(documents, &output, &format!("{} Master", title))?;

    if let Some(file) = cover_file {
        file.close()?;
    }

    info!("Master PDF created: {} ({} pages)", output.display(), pages);

    Ok(MergeOutcome::Merged { path: output, inputs, pages })
}

/// Concatenate `documents` and save the result, returning its page count
fn write_merged(documents: Vec<Document>, output: &Path, title: &str) -> Result<usize> {
    let mut merged_doc = merge_documents(documents)?;
    let pages = merged_doc.get_pages().len();

    if !title.is_empty() {
        let info_id = merged_doc.add_object(Object::Dictionary(super::document::info_dictionary(title)));
        merged_doc.trailer.set("Info", Object::Reference(info_id));
    }

    merged_doc.compress();
    merged_doc.save(output)?;

    Ok(pages)
}

/// Build one document whose page tree lists every page of `documents` in order
fn merge_documents(documents: Vec<Document>) -> Result<Document> {
    // Define a starting max_id for merged document
    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for &page_id in &pages {
            inherit_page_attributes(&mut doc, page_id)?;
        }
        page_ids.extend(pages);

        // The old catalog and page-tree nodes are replaced below
        objects.extend(doc.objects.into_iter().filter(|(_, object)| !is_page_tree_node(object)));
    }

    let mut merged_doc = Document::with_version("1.5");
    merged_doc.objects.extend(objects);

    // new_object_id() must not hand out IDs that collide with the objects just added
    merged_doc.max_id = max_id - 1;

    let pages_id = merged_doc.new_object_id();

    let kids: Vec<Object> = page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = merged_doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged_doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));
    merged_doc.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(dict)) = merged_doc.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    Ok(merged_doc)
}

/// True for catalog and intermediate page-tree dictionaries
fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type"),
            Ok(Object::Name(name)) if name.as_slice() == b"Catalog" || name.as_slice() == b"Pages"
        ),
        _ => false,
    }
}

/// Copy attributes the page inherits from its ancestors onto the page itself,
/// so it renders the same once re-parented
fn inherit_page_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited: Vec<(Vec<u8>, Object)> = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        let mut missing: Vec<&[u8]> = INHERITABLE
            .iter()
            .copied()
            .filter(|key| !page.has(key))
            .collect();
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;

        // The depth cap guards against cyclic Parent links in damaged files
        while let Some(parent_id) = parent {
            if missing.is_empty() || depth > 64 {
                break;
            }
            let Ok(node) = doc.get_dictionary(parent_id) else {
                break;
            };
            missing.retain(|key| match node.get(key) {
                Ok(value) => {
                    inherited.push((key.to_vec(), value.clone()));
                    false
                }
                Err(_) => true,
            });
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }
    }

    if !inherited.is_empty() {
        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key, value);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_path() {
        let path = master_path(Path::new("/Photos"), "TNCG", "Lincoln ISD");
        assert_eq!(path, Path::new("/Photos/TNCG Lincoln ISD Master PDF.pdf"));
    }

    #[test]
    fn test_master_title_prefers_config() {
        let mut config = ReportConfig::default();
        assert_eq!(master_title(Path::new("/Photos/Lincoln ISD"), &config), "Lincoln ISD");

        config.master_title = Some("Spring Survey".to_string());
        assert_eq!(master_title(Path::new("/Photos/Lincoln ISD"), &config), "Spring Survey");
    }

    #[test]
    fn test_is_page_tree_node() {
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));

        assert!(is_page_tree_node(&Object::Dictionary(catalog)));
        assert!(!is_page_tree_node(&Object::Dictionary(page)));
        assert!(!is_page_tree_node(&Object::Integer(3)));
    }

    #[test]
    fn test_inherit_media_box_from_parent() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        let page_id = doc.add_object(Object::Dictionary(page));

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        pages.set("Count", Object::Integer(1));
        pages.set("MediaBox", Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ]));
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        inherit_page_attributes(&mut doc, page_id).unwrap();

        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(!page.has(b"Rotate"));
    }
}
