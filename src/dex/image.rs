use super::ClassDescriptor;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One bytecode image: an ordered, deduplicated list of class descriptors
///
/// A distribution usually carries several images (`classes.dex`,
/// `classes2.dex`, ...); a stored version artifact is the ordered list of
/// all of them.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Image {
    pub classes: Vec<ClassDescriptor>,
}

/// Source of class descriptors for a stored version artifact
///
/// This is the seam where a real bytecode parser would plug in. The diff
/// core only ever sees the flat class list this trait produces.
pub trait ImageLoader {
    /// Load every image in the artifact and flatten into one class list
    ///
    /// Classes must come out sorted by their in-image `index`, images in
    /// artifact order, so that diffing sees a stable, meaningful order.
    fn load(&self, path: &Path) -> Result<Vec<ClassDescriptor>, Error>;
}

/// Loads artifacts stored as a JSON array of images
pub struct JsonImageLoader;

impl ImageLoader for JsonImageLoader {
    fn load(&self, path: &Path) -> Result<Vec<ClassDescriptor>, Error> {
        let bytes = fs::read(path)?;
        let images: Vec<Image> = serde_json::from_slice(&bytes)?;
        log::info!("artifact {} has {} images", path.display(), images.len());

        let mut classes = vec![];
        for mut image in images {
            image.classes.sort_by_key(|cls| cls.index);
            classes.extend(image.classes);
        }
        Ok(classes)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dex::ClassAccessFlags;
    use std::io::Write;

    #[test]
    fn loads_images_in_order_and_classes_by_index() {
        let first = Image {
            classes: vec![
                ClassDescriptor::new(1, "b", "", ClassAccessFlags::PUBLIC),
                ClassDescriptor::new(0, "a", "", ClassAccessFlags::PUBLIC),
            ],
        };
        let second = Image {
            classes: vec![ClassDescriptor::new(0, "c", "", ClassAccessFlags::PUBLIC)],
        };

        let mut file = tempfile::NamedTempFile::new().unwrap();
        serde_json::to_writer(&mut file, &vec![first, second]).unwrap();
        file.flush().unwrap();

        let classes = JsonImageLoader.load(file.path()).unwrap();
        let names: Vec<&str> = classes.iter().map(|cls| cls.fullname.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
