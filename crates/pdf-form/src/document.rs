//! PDF Document wrapper

use crate::image::{
    calculate_scaled_dimensions, generate_image_operators, ImageScaleMode, ImageXObject,
};
use crate::{PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// PDF document wrapper providing form-filling operations
///
/// Wraps a `lopdf::Document` opened from an existing template. Field
/// updates (see `fields.rs`) mutate annotation objects in place; image
/// insertions are buffered and flushed to page content streams at save
/// time so each page gets a single combined stream object.
pub struct FormDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Embedded images (data hash -> PDF object ID)
    embedded_images: HashMap<u64, ObjectId>,
    /// Page image resources (page number -> image name -> object ID)
    page_image_resources: HashMap<usize, HashMap<String, ObjectId>>,
    /// Next image resource number
    next_image_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
}

impl FormDocument {
    /// Open a PDF document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_inner(inner))
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_inner(inner))
    }

    fn from_inner(inner: Document) -> Self {
        Self {
            inner,
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            next_image_resource: 1,
            page_content_buffer: HashMap::new(),
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Get a mutable reference to the underlying lopdf document
    pub fn inner_mut(&mut self) -> &mut Document {
        &mut self.inner
    }

    /// Set /NeedAppearances on the AcroForm dictionary
    ///
    /// Viewers then regenerate widget appearance streams from the filled
    /// /V values. A document without an AcroForm entry is left untouched.
    pub fn set_need_appearances(&mut self) -> Result<()> {
        let catalog_id = self
            .inner
            .trailer
            .get(b"Root")
            .and_then(|o| o.as_reference())
            .map_err(|_| PdfError::ParseError("Document trailer missing Root entry".to_string()))?;

        // Resolve where the AcroForm lives before taking a mutable borrow
        let form_ref: Option<Option<ObjectId>> = {
            let catalog = self.inner.get_object(catalog_id)?.as_dict().map_err(|_| {
                PdfError::ParseError("Catalog is not a dictionary".to_string())
            })?;
            match catalog.get(b"AcroForm") {
                Ok(Object::Reference(form_id)) => Some(Some(*form_id)),
                Ok(Object::Dictionary(_)) => Some(None),
                _ => None,
            }
        };

        match form_ref {
            // AcroForm as an indirect object
            Some(Some(form_id)) => {
                let form = self.inner.get_object_mut(form_id)?.as_dict_mut()?;
                form.set("NeedAppearances", Object::Boolean(true));
            }
            // AcroForm inlined in the catalog
            Some(None) => {
                let catalog = self.inner.get_object_mut(catalog_id)?.as_dict_mut()?;
                if let Ok(Object::Dictionary(form)) = catalog.get_mut(b"AcroForm") {
                    form.set("NeedAppearances", Object::Boolean(true));
                }
            }
            None => {
                tracing::debug!("document has no AcroForm dictionary");
            }
        }

        Ok(())
    }

    /// Insert an image at a position in PDF user space
    ///
    /// Coordinates are PDF user space (origin at the lower-left corner of
    /// the page), matching the rectangles of the template's photo slots.
    /// The image is stretched to the given dimensions.
    ///
    /// # Arguments
    /// * `data` - Image file bytes
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate in points (from bottom)
    /// * `width` - Image width in points
    /// * `height` - Image height in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.insert_image_scaled(data, page, x, y, width, height, ImageScaleMode::Stretch)
    }

    /// Insert an image with a scaling mode
    ///
    /// With `ImageScaleMode::FitBox` the image keeps its aspect ratio and
    /// is anchored at the slot origin.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_image_scaled(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        let (image_resource_name, orig_width, orig_height) =
            self.get_or_create_image_ref(data, page)?;

        let (actual_width, actual_height) =
            calculate_scaled_dimensions(orig_width, orig_height, width, height, mode);

        let operators =
            generate_image_operators(&image_resource_name, x, y, actual_width, actual_height);

        // Buffered; flushed into the page content stream at save time
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.flush_content_buffers()?;
        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush_content_buffers()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Get or create an image reference for a specific page
    ///
    /// Returns the resource name (e.g., "Im1", "Im2") and original
    /// dimensions. Images are deduplicated by hash of their data.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<(String, u32, u32)> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        if !self.embedded_images.contains_key(&data_hash) {
            let xobject = ImageXObject::from_bytes(data)?;
            let stream = xobject.to_pdf_stream();
            let object_id = self.inner.add_object(stream);
            self.embedded_images.insert(data_hash, object_id);
        }

        let object_id = self.embedded_images[&data_hash];

        // Read the dimensions back off the embedded XObject
        let xobject_stream = self.inner.get_object(object_id)?;
        let xobject_dict = &xobject_stream
            .as_stream()
            .map_err(|_| PdfError::ParseError("Image object is not a stream".to_string()))?
            .dict;
        let width = xobject_dict
            .get(b"Width")
            .ok()
            .and_then(|v| v.as_i64().ok())
            .map(|v| v as u32)
            .ok_or_else(|| PdfError::ParseError("Image missing Width".to_string()))?;
        let height = xobject_dict
            .get(b"Height")
            .ok()
            .and_then(|v| v.as_i64().ok())
            .map(|v| v as u32)
            .ok_or_else(|| PdfError::ParseError("Image missing Height".to_string()))?;

        let page_resources = self.page_image_resources.entry(page).or_default();

        // Reuse the resource name if this object is already on the page
        for (name, id) in page_resources.iter() {
            if *id == object_id {
                return Ok((name.clone(), width, height));
            }
        }

        let resource_name = format!("Im{}", self.next_image_resource);
        self.next_image_resource += 1;

        page_resources.insert(resource_name.clone(), object_id);

        self.add_image_to_page_resources(page, &resource_name, object_id)?;

        Ok((resource_name, width, height))
    }

    /// Add image to a specific page's Resources dictionary
    fn add_image_to_page_resources(
        &mut self,
        page: usize,
        resource_name: &str,
        object_id: ObjectId,
    ) -> Result<()> {
        let pages = self.inner.get_pages();
        let page_id = *pages
            .get(&(page as u32))
            .ok_or(PdfError::InvalidPage(page, pages.len()))?;

        let page_obj = self.inner.get_object(page_id)?;
        let page_dict = page_obj
            .as_dict()
            .map_err(|_| PdfError::SaveError("Page object is not a dictionary".to_string()))?;

        // Get or create Resources dictionary
        let resources_dict = match page_dict.get(b"Resources") {
            Ok(resources) => match resources.as_dict() {
                Ok(dict) => dict.clone(),
                Err(_) => Dictionary::new(),
            },
            Err(_) => Dictionary::new(),
        };

        // Get or create XObject dictionary in Resources
        let xobject_dict = match resources_dict.get(b"XObject") {
            Ok(xobject) => match xobject.as_dict() {
                Ok(dict) => dict.clone(),
                Err(_) => Dictionary::new(),
            },
            Err(_) => Dictionary::new(),
        };

        let mut new_xobject_dict = xobject_dict.clone();
        new_xobject_dict.set(resource_name.as_bytes(), Object::Reference(object_id));

        let mut new_resources = resources_dict.clone();
        new_resources.set(b"XObject", Object::Dictionary(new_xobject_dict));

        let mut new_page_dict = page_dict.clone();
        new_page_dict.set(b"Resources", Object::Dictionary(new_resources));

        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Buffer content operators for a page (written at save time)
    ///
    /// Instead of immediately appending to the content stream (which
    /// creates orphan objects), this buffers the operators and flushes
    /// them all at once during save.
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content stream
    ///
    /// Handles both compressed and uncompressed content streams, and
    /// /Contents as a stream, a reference, or an array of either.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let pages = self.inner.get_pages();
        let page_id = *pages
            .get(&(page as u32))
            .ok_or(PdfError::InvalidPage(page, pages.len()))?;

        let (existing_content, page_dict_clone) = {
            let page_obj = self.inner.get_object(page_id)?;
            let page_dict = page_obj
                .as_dict()
                .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;

            let page_dict_clone = page_dict.clone();

            let existing_content = match page_dict.get(b"Contents") {
                Ok(contents) => match contents {
                    Object::Stream(stream) => stream
                        .decompressed_content()
                        .unwrap_or_else(|_| stream.content.clone()),
                    Object::Reference(ref_id) => {
                        if let Ok(Object::Stream(stream)) = self.inner.get_object(*ref_id) {
                            stream
                                .decompressed_content()
                                .unwrap_or_else(|_| stream.content.clone())
                        } else {
                            Vec::new()
                        }
                    }
                    Object::Array(arr) => {
                        let mut combined = Vec::new();
                        for obj in arr {
                            match obj {
                                Object::Reference(ref_id) => {
                                    if let Ok(Object::Stream(stream)) =
                                        self.inner.get_object(*ref_id)
                                    {
                                        let data = stream
                                            .decompressed_content()
                                            .unwrap_or_else(|_| stream.content.clone());
                                        combined.extend_from_slice(&data);
                                    }
                                }
                                Object::Stream(stream) => {
                                    let data = stream
                                        .decompressed_content()
                                        .unwrap_or_else(|_| stream.content.clone());
                                    combined.extend_from_slice(&data);
                                }
                                _ => {}
                            }
                        }
                        combined
                    }
                    _ => Vec::new(),
                },
                Err(_) => Vec::new(),
            };

            (existing_content, page_dict_clone)
        };

        let mut new_content = existing_content;
        new_content.extend_from_slice(content);

        let new_stream = Stream::new(Dictionary::new(), new_content);
        let stream_id = self.inner.add_object(new_stream);

        let mut new_page_dict = page_dict_clone;
        new_page_dict.set(b"Contents", Object::Reference(stream_id));

        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }
}
