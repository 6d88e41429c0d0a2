//! Shading language type system

use std::rc::Rc;

use crate::symbols::{SymbolIndex, SymbolTable};
use crate::{Error, Result};

/// Component kind of a scalar, vector or matrix type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    Float,
    Int,
    Bool,
}

impl ScalarKind {
    /// Scalar basic type of this kind
    pub fn scalar(self) -> BasicType {
        match self {
            Self::Float => BasicType::Float,
            Self::Int => BasicType::Int,
            Self::Bool => BasicType::Bool,
        }
    }
}

/// Non-aggregate types, including the pseudo-types only found in built-in signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BasicType {
    Void,
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    BVec2,
    BVec3,
    BVec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
    SamplerCube,
    /// `float`, `vec2`, `vec3` or `vec4`, fixed per call site
    GenType,
    /// Any float vector
    VecType,
    /// Any int vector
    IVecType,
    /// Any bool vector
    BVecType,
}

// GL enums reported through reflection
const GL_FLOAT: u32 = 0x1406;
const GL_FLOAT_VEC2: u32 = 0x8B50;
const GL_FLOAT_VEC3: u32 = 0x8B51;
const GL_FLOAT_VEC4: u32 = 0x8B52;
const GL_INT: u32 = 0x1404;
const GL_INT_VEC2: u32 = 0x8B53;
const GL_INT_VEC3: u32 = 0x8B54;
const GL_INT_VEC4: u32 = 0x8B55;
const GL_BOOL: u32 = 0x8B56;
const GL_BOOL_VEC2: u32 = 0x8B57;
const GL_BOOL_VEC3: u32 = 0x8B58;
const GL_BOOL_VEC4: u32 = 0x8B59;
const GL_FLOAT_MAT2: u32 = 0x8B5A;
const GL_FLOAT_MAT3: u32 = 0x8B5B;
const GL_FLOAT_MAT4: u32 = 0x8B5C;
const GL_SAMPLER_2D: u32 = 0x8B5E;
const GL_SAMPLER_CUBE: u32 = 0x8B60;

impl BasicType {
    /// Component kind, `None` for void, samplers and pseudo-types
    pub fn scalar_kind(self) -> Option<ScalarKind> {
        use BasicType::*;

        match self {
            Float | Vec2 | Vec3 | Vec4 | Mat2 | Mat3 | Mat4 => Some(ScalarKind::Float),
            Int | IVec2 | IVec3 | IVec4 => Some(ScalarKind::Int),
            Bool | BVec2 | BVec3 | BVec4 => Some(ScalarKind::Bool),
            _ => None,
        }
    }

    pub fn is_scalar(self) -> bool {
        matches!(self, Self::Float | Self::Int | Self::Bool)
    }

    pub fn is_vector(self) -> bool {
        use BasicType::*;
        matches!(
            self,
            Vec2 | Vec3 | Vec4 | IVec2 | IVec3 | IVec4 | BVec2 | BVec3 | BVec4
        )
    }

    pub fn is_matrix(self) -> bool {
        matches!(self, Self::Mat2 | Self::Mat3 | Self::Mat4)
    }

    pub fn is_sampler(self) -> bool {
        matches!(self, Self::Sampler2D | Self::SamplerCube)
    }

    /// Return true for types that only appear in built-in signature templates
    pub fn is_pseudo(self) -> bool {
        use BasicType::*;
        matches!(self, GenType | VecType | IVecType | BVecType)
    }

    /// Return true for float and int scalars, vectors and matrices
    pub fn is_numeric(self) -> bool {
        matches!(
            self.scalar_kind(),
            Some(ScalarKind::Float) | Some(ScalarKind::Int)
        )
    }

    /// Return true for the concrete types a gentype placeholder can resolve to
    pub fn is_gentype_member(self) -> bool {
        use BasicType::*;
        matches!(self, Float | Vec2 | Vec3 | Vec4)
    }

    /// Number of components of a vector, number of columns of a matrix, 1 for scalars
    pub fn size(self) -> u32 {
        use BasicType::*;

        match self {
            Float | Int | Bool => 1,
            Vec2 | IVec2 | BVec2 | Mat2 => 2,
            Vec3 | IVec3 | BVec3 | Mat3 => 3,
            Vec4 | IVec4 | BVec4 | Mat4 => 4,
            _ => 0,
        }
    }

    /// Number of rows: the component count of vectors, the column height of matrices
    pub fn rows(self) -> u32 {
        self.size()
    }

    /// Number of columns: 1 for scalars and vectors
    pub fn cols(self) -> u32 {
        if self.is_matrix() {
            self.size()
        } else if self.scalar_kind().is_some() {
            1
        } else {
            0
        }
    }

    /// Total number of scalar components
    pub fn component_count(self) -> u32 {
        self.rows() * self.cols()
    }

    /// Vector (or scalar, for a size of 1) type of the given kind
    pub fn vector(kind: ScalarKind, size: u32) -> Option<Self> {
        use BasicType::*;

        Some(match (kind, size) {
            (ScalarKind::Float, 1) => Float,
            (ScalarKind::Float, 2) => Vec2,
            (ScalarKind::Float, 3) => Vec3,
            (ScalarKind::Float, 4) => Vec4,
            (ScalarKind::Int, 1) => Int,
            (ScalarKind::Int, 2) => IVec2,
            (ScalarKind::Int, 3) => IVec3,
            (ScalarKind::Int, 4) => IVec4,
            (ScalarKind::Bool, 1) => Bool,
            (ScalarKind::Bool, 2) => BVec2,
            (ScalarKind::Bool, 3) => BVec3,
            (ScalarKind::Bool, 4) => BVec4,
            _ => return None,
        })
    }

    /// Square float matrix of the given size
    pub fn matrix(size: u32) -> Option<Self> {
        match size {
            2 => Some(Self::Mat2),
            3 => Some(Self::Mat3),
            4 => Some(Self::Mat4),
            _ => None,
        }
    }

    /// Type produced by indexing: the component of a vector, the column of a matrix
    pub fn index_result(self) -> Option<Self> {
        if self.is_vector() {
            self.scalar_kind().map(ScalarKind::scalar)
        } else if self.is_matrix() {
            Self::vector(ScalarKind::Float, self.size())
        } else {
            None
        }
    }

    /// GL type enum, `None` for void and pseudo-types
    pub fn gl_enum(self) -> Option<u32> {
        use BasicType::*;

        Some(match self {
            Float => GL_FLOAT,
            Vec2 => GL_FLOAT_VEC2,
            Vec3 => GL_FLOAT_VEC3,
            Vec4 => GL_FLOAT_VEC4,
            Int => GL_INT,
            IVec2 => GL_INT_VEC2,
            IVec3 => GL_INT_VEC3,
            IVec4 => GL_INT_VEC4,
            Bool => GL_BOOL,
            BVec2 => GL_BOOL_VEC2,
            BVec3 => GL_BOOL_VEC3,
            BVec4 => GL_BOOL_VEC4,
            Mat2 => GL_FLOAT_MAT2,
            Mat3 => GL_FLOAT_MAT3,
            Mat4 => GL_FLOAT_MAT4,
            Sampler2D => GL_SAMPLER_2D,
            SamplerCube => GL_SAMPLER_CUBE,
            Void | GenType | VecType | IVecType | BVecType => return None,
        })
    }

    /// Shading language spelling
    pub fn glsl_name(self) -> &'static str {
        use BasicType::*;

        match self {
            Void => "void",
            Float => "float",
            Int => "int",
            Bool => "bool",
            Vec2 => "vec2",
            Vec3 => "vec3",
            Vec4 => "vec4",
            IVec2 => "ivec2",
            IVec3 => "ivec3",
            IVec4 => "ivec4",
            BVec2 => "bvec2",
            BVec3 => "bvec3",
            BVec4 => "bvec4",
            Mat2 => "mat2",
            Mat3 => "mat3",
            Mat4 => "mat4",
            Sampler2D => "sampler2D",
            SamplerCube => "samplerCube",
            GenType => "genType",
            VecType => "vec",
            IVecType => "ivec",
            BVecType => "bvec",
        }
    }
}

/// A named structure member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: SymbolIndex,
    pub ty: Type,
}

/// A structure type
///
/// Equality compares the name and the ordered fields. The `id` tells apart declarations that
/// happen to look the same and is only used to name the generated type.
#[derive(Debug)]
pub struct StructType {
    id: u32,
    name: SymbolIndex,
    fields: Vec<StructField>,
}

impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

impl Eq for StructType {}

impl StructType {
    /// Unique id of the declaration this type comes from
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> SymbolIndex {
        self.name
    }

    pub fn fields(&self) -> &[StructField] {
        &self.fields[..]
    }

    /// Find a field by name, returning its position and definition
    pub fn field(&self, name: SymbolIndex) -> Option<(usize, &StructField)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }
}

/// A shading language type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Basic(BasicType),
    Array { element: Box<Type>, size: u32 },
    Struct(Rc<StructType>),
}

/// Flattened reflection entry for a leaf of a variable type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveInfo {
    /// Output-language access path
    pub name: String,
    /// GL type enum
    pub gl_type: u32,
    /// Array size, 1 for non-arrays
    pub size: u32,
}

impl From<BasicType> for Type {
    fn from(basic: BasicType) -> Self {
        Self::Basic(basic)
    }
}

impl Type {
    pub fn basic(basic: BasicType) -> Self {
        Self::Basic(basic)
    }

    /// Wrap `element` into an array of `size` elements
    pub fn array_of(element: Type, size: u32) -> Self {
        Self::Array {
            element: Box::new(element),
            size,
        }
    }

    /// Build a structure type from its ordered fields
    ///
    /// # Parameters
    ///
    /// * `id`: unique id of the declaration site
    /// * `name`: structure name
    /// * `fields`: ordered fields
    pub fn structure(id: u32, name: SymbolIndex, fields: Vec<StructField>) -> Self {
        Self::Struct(Rc::new(StructType { id, name, fields }))
    }

    pub fn as_basic(&self) -> Option<BasicType> {
        match self {
            Self::Basic(basic) => Some(*basic),
            _ => None,
        }
    }

    /// Basic type of this type
    ///
    /// # Errors
    ///
    /// Returns an internal error for arrays and structures.
    pub fn basic_type(&self) -> Result<BasicType> {
        self.as_basic()
            .ok_or_else(|| Error::internal("basic type requested for an aggregate type"))
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array { .. })
    }

    /// Number of elements of an array type
    ///
    /// # Errors
    ///
    /// Returns an internal error for non-array types.
    pub fn array_size(&self) -> Result<u32> {
        match self {
            Self::Array { size, .. } => Ok(*size),
            _ => Err(Error::internal("array size requested for a non-array type")),
        }
    }

    /// Element type of an array type
    ///
    /// # Errors
    ///
    /// Returns an internal error for non-array types.
    pub fn element_type(&self) -> Result<&Type> {
        match self {
            Self::Array { element, .. } => Ok(element),
            _ => Err(Error::internal("element type requested for a non-array type")),
        }
    }

    /// Return true if this is exactly the given basic type
    pub fn is(&self, basic: BasicType) -> bool {
        self.as_basic() == Some(basic)
    }

    pub fn is_void(&self) -> bool {
        self.is(BasicType::Void)
    }

    /// Return true for sampler types, not looking through arrays
    pub fn is_sampler(&self) -> bool {
        self.as_basic().map(BasicType::is_sampler).unwrap_or(false)
    }

    /// Return true for samplers and arrays of samplers
    pub fn is_sampler_or_array(&self) -> bool {
        match self {
            Self::Array { element, .. } => element.is_sampler_or_array(),
            other => other.is_sampler(),
        }
    }

    /// Return true if a sampler is found anywhere in this type
    pub fn contains_sampler(&self) -> bool {
        match self {
            Self::Basic(basic) => basic.is_sampler(),
            Self::Array { element, .. } => element.contains_sampler(),
            Self::Struct(s) => s.fields.iter().any(|f| f.ty.contains_sampler()),
        }
    }

    /// Return true if an array is found anywhere in this type
    pub fn contains_array(&self) -> bool {
        match self {
            Self::Basic(_) => false,
            Self::Array { .. } => true,
            Self::Struct(s) => s.fields.iter().any(|f| f.ty.contains_array()),
        }
    }

    pub fn is_struct_or_array_of_structs(&self) -> bool {
        match self {
            Self::Struct(_) => true,
            Self::Array { element, .. } => element.is_struct_or_array_of_structs(),
            Self::Basic(_) => false,
        }
    }

    /// Depth of structure nesting: 0 for non-structures, 1 for flat structures
    pub fn struct_nesting_level(&self) -> u32 {
        match self {
            Self::Basic(_) => 0,
            Self::Array { element, .. } => element.struct_nesting_level(),
            Self::Struct(s) => {
                1 + s
                    .fields
                    .iter()
                    .map(|f| f.ty.struct_nesting_level())
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// GL type enum of this type, or of its elements for arrays
    pub fn gl_enum(&self) -> Option<u32> {
        match self {
            Self::Basic(basic) => basic.gl_enum(),
            Self::Array { element, .. } => element.gl_enum(),
            Self::Struct(_) => None,
        }
    }

    /// Readable spelling of this type, for diagnostics
    pub fn describe(&self, symbols: &SymbolTable) -> String {
        match self {
            Self::Basic(basic) => basic.glsl_name().to_owned(),
            Self::Array { element, size } => format!("{}[{}]", element.describe(symbols), size),
            Self::Struct(s) => symbols.text(s.name).to_owned(),
        }
    }

    /// Compare types coming from two independently interned compilations
    ///
    /// Structures match when their names, field names and field types match in order,
    /// regardless of which symbol table their indices come from.
    ///
    /// # Parameters
    ///
    /// * `symbols`: symbol table `self` was built with
    /// * `other`: type to compare with
    /// * `other_symbols`: symbol table `other` was built with
    pub fn equal_for_uniforms(
        &self,
        symbols: &SymbolTable,
        other: &Type,
        other_symbols: &SymbolTable,
    ) -> bool {
        match (self, other) {
            (Self::Basic(a), Self::Basic(b)) => a == b,
            (
                Self::Array {
                    element: a,
                    size: sa,
                },
                Self::Array {
                    element: b,
                    size: sb,
                },
            ) => sa == sb && a.equal_for_uniforms(symbols, b, other_symbols),
            (Self::Struct(a), Self::Struct(b)) => {
                symbols.text(a.name) == other_symbols.text(b.name)
                    && a.fields.len() == b.fields.len()
                    && a.fields.iter().zip(b.fields.iter()).all(|(fa, fb)| {
                        symbols.text(fa.name) == other_symbols.text(fb.name)
                            && fa.ty.equal_for_uniforms(symbols, &fb.ty, other_symbols)
                    })
            }
            _ => false,
        }
    }

    /// Flatten this type into its reflection leaves
    ///
    /// # Parameters
    ///
    /// * `name`: access path of the value of this type
    /// * `field_name`: output name of a structure field
    /// * `out`: list receiving the leaves
    ///
    /// # Errors
    ///
    /// Returns an internal error if a leaf has no GL type.
    pub fn flatten_active(
        &self,
        name: &str,
        field_name: &dyn Fn(SymbolIndex) -> String,
        out: &mut Vec<ActiveInfo>,
    ) -> Result<()> {
        match self {
            Self::Basic(basic) => out.push(ActiveInfo {
                name: name.to_owned(),
                gl_type: basic
                    .gl_enum()
                    .ok_or_else(|| Error::internal("no GL type for reflected variable"))?,
                size: 1,
            }),
            Self::Array { element, size } => {
                if element.is_struct_or_array_of_structs() {
                    for i in 0..*size {
                        element.flatten_active(&format!("{}[{}]", name, i), field_name, out)?;
                    }
                } else {
                    out.push(ActiveInfo {
                        name: name.to_owned(),
                        gl_type: element
                            .gl_enum()
                            .ok_or_else(|| Error::internal("no GL type for reflected array"))?,
                        size: *size,
                    });
                }
            }
            Self::Struct(s) => {
                for field in &s.fields {
                    field.ty.flatten_active(
                        &format!("{}.{}", name, field_name(field.name)),
                        field_name,
                        out,
                    )?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_struct(symbols: &mut SymbolTable, id: u32) -> Type {
        let name = symbols.intern("S").unwrap();
        let a = symbols.intern("a").unwrap();
        let b = symbols.intern("b").unwrap();

        Type::structure(
            id,
            name,
            vec![
                StructField {
                    name: a,
                    ty: BasicType::Float.into(),
                },
                StructField {
                    name: b,
                    ty: Type::array_of(BasicType::Vec3.into(), 2),
                },
            ],
        )
    }

    #[test]
    fn array_equality_depends_on_size() {
        let t: Type = BasicType::Vec4.into();
        assert_eq!(t, t.clone());
        assert_eq!(Type::array_of(t.clone(), 3), Type::array_of(t.clone(), 3));
        assert_ne!(Type::array_of(t.clone(), 3), Type::array_of(t, 4));
    }

    #[test]
    fn struct_equality_is_structural() {
        let mut symbols = SymbolTable::new();
        let s1 = sample_struct(&mut symbols, 0);
        let s2 = sample_struct(&mut symbols, 1);
        assert_eq!(s1, s2);

        let name = symbols.intern("S").unwrap();
        let b = symbols.intern("b").unwrap();
        let reordered = Type::structure(
            2,
            name,
            vec![StructField {
                name: b,
                ty: BasicType::Float.into(),
            }],
        );
        assert_ne!(s1, reordered);
    }

    #[test]
    fn aggregate_queries_are_internal_errors() {
        let mut symbols = SymbolTable::new();
        let s = sample_struct(&mut symbols, 0);

        assert!(matches!(s.basic_type(), Err(Error::Internal(_))));
        assert!(matches!(
            Type::from(BasicType::Float).array_size(),
            Err(Error::Internal(_))
        ));
        assert!(matches!(
            Type::from(BasicType::Float).element_type(),
            Err(Error::Internal(_))
        ));
        assert_eq!(
            Type::array_of(BasicType::Int.into(), 2).element_type().unwrap(),
            &Type::Basic(BasicType::Int)
        );
    }

    #[test]
    fn uniform_equality_across_tables() {
        let mut vs = SymbolTable::new();
        let mut fs = SymbolTable::new();
        // Shift the indices of the second table
        fs.intern("unrelated").unwrap();

        let a = sample_struct(&mut vs, 0);
        let b = sample_struct(&mut fs, 0);

        assert_ne!(a, b);
        assert!(a.equal_for_uniforms(&vs, &b, &fs));
        assert!(!a.equal_for_uniforms(&vs, &BasicType::Float.into(), &fs));
    }

    #[test]
    fn matrix_shape() {
        assert_eq!(BasicType::Mat3.rows(), 3);
        assert_eq!(BasicType::Mat3.cols(), 3);
        assert_eq!(BasicType::Vec3.cols(), 1);
        assert_eq!(BasicType::Mat4.index_result(), Some(BasicType::Vec4));
        assert_eq!(BasicType::IVec2.index_result(), Some(BasicType::Int));
        assert_eq!(BasicType::Float.index_result(), None);
    }

    #[test]
    fn flattening() {
        let mut symbols = SymbolTable::new();
        let s = sample_struct(&mut symbols, 0);
        let t = Type::array_of(s, 2);

        let mut out = Vec::new();
        t.flatten_active(
            "_u",
            &|sym| format!("_{}", symbols.text(sym)),
            &mut out,
        )
        .unwrap();

        let names: Vec<_> = out.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["_u[0]._a", "_u[0]._b", "_u[1]._a", "_u[1]._b"]);
        assert_eq!(out[1].size, 2);
        assert_eq!(out[1].gl_type, GL_FLOAT_VEC3);
        assert!(t.is_struct_or_array_of_structs());
        assert_eq!(t.struct_nesting_level(), 1);
    }
}
