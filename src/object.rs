//! PDF object types.
//!
//! The structure reader operates on already-parsed values: dictionaries,
//! arrays, numbers, names and indirect references. Streams keep their raw
//! bytes but are never decoded here.

use crate::error::{Error, Result};
use crate::geometry::Rect;
use std::collections::HashMap;

/// A PDF dictionary.
pub type Dictionary = HashMap<String, Object>;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String (byte array)
    String(Vec<u8>),
    /// Name (starting with /)
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary (key-value pairs)
    Dictionary(Dictionary),
    /// Stream (dictionary + data)
    Stream {
        /// Stream dictionary
        dict: Dictionary,
        /// Stream data
        data: bytes::Bytes,
    },
    /// Indirect object reference
    Reference(ObjectRef),
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

impl From<ObjectRef> for Object {
    fn from(r: ObjectRef) -> Self {
        Object::Reference(r)
    }
}

impl From<i64> for Object {
    fn from(i: i64) -> Self {
        Object::Integer(i)
    }
}

impl From<f64> for Object {
    fn from(r: f64) -> Self {
        Object::Real(r)
    }
}

impl From<Vec<Object>> for Object {
    fn from(arr: Vec<Object>) -> Self {
        Object::Array(arr)
    }
}

impl From<Dictionary> for Object {
    fn from(dict: Dictionary) -> Self {
        Object::Dictionary(dict)
    }
}

impl Object {
    /// Build a name object.
    pub fn name(name: impl Into<String>) -> Self {
        Object::Name(name.into())
    }

    /// Build a dictionary object from key/value pairs.
    ///
    /// ```
    /// use pdf_structure::object::Object;
    ///
    /// let mcr = Object::dict([("Type", Object::name("MCR")), ("MCID", Object::Integer(3))]);
    /// assert_eq!(mcr.dict_type(), Some("MCR"));
    /// ```
    pub fn dict<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Object)>,
    {
        Object::Dictionary(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Get the type name of this object (without data).
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Stream { .. } => "Stream",
            Object::Reference(_) => "Reference",
        }
    }

    /// Try to cast to integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to cast to a number, accepting both integers and reals.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to dictionary. Works for both Dictionary and Stream objects.
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Try to cast to array.
    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to cast to reference.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to string (bytes).
    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if object is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Check if object is a stream.
    pub fn is_stream(&self) -> bool {
        matches!(self, Object::Stream { .. })
    }

    /// The `/Type` name of a dictionary or stream, if present and a name.
    pub fn dict_type(&self) -> Option<&str> {
        self.as_dict()?.get("Type")?.as_name()
    }
}

/// Extract a rectangle from a `[x0 y0 x1 y1]` array.
///
/// Corners are normalized so that `x0 <= x1` and `y0 <= y1`.
pub fn rect_value(obj: &Object) -> Result<Rect> {
    let invalid = || Error::InvalidObjectType {
        expected: "Rectangle".to_string(),
        found: obj.type_name().to_string(),
    };
    let arr = obj.as_array().ok_or_else(invalid)?;
    if arr.len() != 4 {
        return Err(invalid());
    }
    let mut coords = [0.0f32; 4];
    for (slot, value) in coords.iter_mut().zip(arr) {
        *slot = value.as_number().ok_or_else(invalid)? as f32;
    }
    Ok(Rect::from_corners(coords[0], coords[1], coords[2], coords[3]))
}

/// Extract a dictionary, failing with a type mismatch otherwise.
pub fn dict_value(obj: &Object) -> Result<&Dictionary> {
    match obj {
        Object::Dictionary(d) => Ok(d),
        _ => Err(Error::InvalidObjectType {
            expected: "Dictionary".to_string(),
            found: obj.type_name().to_string(),
        }),
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8 with BOM, or
/// PDFDocEncoding approximated as Latin-1).
pub fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(&bytes[3..]).into_owned()
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// In-memory table of indirect objects.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    objects: HashMap<ObjectRef, Object>,
    next_id: u32,
}

impl ObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert an object under a fresh object number and return its reference.
    pub fn insert(&mut self, obj: Object) -> ObjectRef {
        let id = self.next_id.max(1);
        let obj_ref = ObjectRef::new(id, 0);
        self.next_id = id + 1;
        self.objects.insert(obj_ref, obj);
        obj_ref
    }

    /// Reserve an object number to be filled later with [`set`](Self::set).
    ///
    /// Needed for cyclic graphs such as `/P` parent links.
    pub fn reserve(&mut self) -> ObjectRef {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        ObjectRef::new(id, 0)
    }

    /// Store an object under an explicit reference, replacing any previous one.
    pub fn set(&mut self, obj_ref: ObjectRef, obj: Object) {
        self.next_id = self.next_id.max(obj_ref.id.saturating_add(1));
        self.objects.insert(obj_ref, obj);
    }

    /// Look up an object.
    pub fn get(&self, obj_ref: ObjectRef) -> Option<&Object> {
        self.objects.get(&obj_ref)
    }

    /// Follow indirect references until a direct object is reached.
    ///
    /// Returns the last reference followed (if any) together with the
    /// resolved object.
    pub fn resolve_with_ref<'a>(
        &'a self,
        obj: &'a Object,
        max_depth: u32,
    ) -> Result<(Option<ObjectRef>, &'a Object)> {
        let mut current = obj;
        let mut last_ref = None;
        let mut seen: Vec<ObjectRef> = Vec::new();
        while let Object::Reference(obj_ref) = current {
            if seen.contains(obj_ref) {
                return Err(Error::CircularReference(*obj_ref));
            }
            if seen.len() as u32 >= max_depth {
                return Err(Error::RecursionLimitExceeded(max_depth));
            }
            seen.push(*obj_ref);
            last_ref = Some(*obj_ref);
            current = self
                .get(*obj_ref)
                .ok_or(Error::ObjectNotFound(obj_ref.id, obj_ref.gen))?;
        }
        Ok((last_ref, current))
    }

    /// Follow indirect references until a direct object is reached.
    pub fn resolve<'a>(&'a self, obj: &'a Object, max_depth: u32) -> Result<&'a Object> {
        self.resolve_with_ref(obj, max_depth).map(|(_, obj)| obj)
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
