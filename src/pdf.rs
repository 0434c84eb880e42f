/*!
 * PDF assembly from a frame set.
 *
 * One page per frame, in order. The page size is taken from the first frame
 * and every frame is drawn stretched to fill its page. Image data is stored as
 * Flate-compressed DeviceRGB XObjects.
 */

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use log::{debug, info};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::errors::PdfError;

const IMAGE_NAME: &str = "Im0";

/// Write `frames` as a PDF at `output`
pub fn write_pdf<P: AsRef<Path>>(
    frames: &[PathBuf],
    output: P,
    progress: &ProgressBar,
) -> Result<(), PdfError> {
    let output = output.as_ref();
    let first = frames.first().ok_or(PdfError::NoFrames)?;

    let (page_width, page_height) =
        image::image_dimensions(first).map_err(|e| PdfError::Image {
            path: first.clone(),
            source: e,
        })?;
    debug!("PDF page size {}x{} from {:?}", page_width, page_height, first);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    progress.set_length(frames.len() as u64);
    let mut kids: Vec<Object> = Vec::with_capacity(frames.len());
    for frame in frames {
        let page_id = add_page(&mut doc, pages_id, frame, page_width, page_height)?;
        kids.push(page_id.into());
        progress.inc(1);
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => frames.len() as i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(output).map_err(|e| PdfError::Write {
        path: output.to_path_buf(),
        source: e,
    })?;

    info!("Wrote {} page(s) to {:?}", frames.len(), output);
    Ok(())
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    frame: &Path,
    page_width: u32,
    page_height: u32,
) -> Result<ObjectId, PdfError> {
    let image = image::open(frame)
        .map_err(|e| PdfError::Image {
            path: frame.to_path_buf(),
            source: e,
        })?
        .to_rgb8();
    let (width, height) = image.dimensions();

    let mut image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        image.into_raw(),
    );
    image_stream
        .compress()
        .map_err(|e| PdfError::Encode(e.to_string()))?;
    let image_id = doc.add_object(image_stream);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(page_width as i64),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(page_height as i64),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| PdfError::Encode(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), (page_width as i64).into(), (page_height as i64).into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
    });

    Ok(page_id)
}
