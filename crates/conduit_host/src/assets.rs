//! The native asset table
//!
//! Assets are keyed by `AssetHandle`. Handles start at 1 and are never
//! reused, so `AssetHandle::NULL` always means "creation failed".

use conduit_core::types::{MeshAttribute, TextureFormat};
use conduit_core::{AssetHandle, ComponentKind, NativePtr, TransformData, UniformKind};
use glam::{IVec2, Vec3, Vec4};
use std::collections::{BTreeMap, HashMap};

/// An instantiable entity template.
#[derive(Debug, Clone)]
pub struct PrefabTemplate {
    pub name: String,
    pub components: Vec<ComponentKind>,
    pub transform: TransformData,
}

#[derive(Debug, Clone, Default)]
pub struct ComputeShaderState {
    pub name: String,
    pub buffers: BTreeMap<u32, NativePtr>,
    pub uniforms: HashMap<String, (UniformKind, Vec<u8>)>,
    pub dispatches: Vec<[u32; 3]>,
}

#[derive(Debug, Clone)]
pub struct TextureState {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub pixels: Vec<u8>,
    pub dirty: bool,
    pub submissions: u32,
}

impl TextureState {
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        let len = width as usize * height as usize * format.channels();
        Self {
            width,
            height,
            format,
            pixels: vec![0; len],
            dirty: false,
            submissions: 0,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Write one pixel from a normalised colour. Out-of-range coordinates
    /// are ignored.
    pub fn set_pixel(&mut self, colour: Vec4, coord: IVec2) -> bool {
        if coord.x < 0 || coord.y < 0 {
            return false;
        }
        let (x, y) = (coord.x as u32, coord.y as u32);
        if x >= self.width || y >= self.height {
            return false;
        }

        let channels = self.format.channels();
        let start = (y as usize * self.width as usize + x as usize) * channels;
        let rgba = colour.clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
        let lanes = [rgba.x, rgba.y, rgba.z, rgba.w];
        for (slot, lane) in self.pixels[start..start + channels].iter_mut().zip(lanes) {
            *slot = lane.round() as u8;
        }
        self.dirty = true;
        true
    }

    /// Replace every pixel, converting from `format` when it differs from
    /// the texture's own. Returns false when the data does not cover the
    /// texture exactly.
    pub fn set_pixel_data(&mut self, data: &[u8], format: TextureFormat) -> bool {
        if data.len() != self.pixel_count() * format.channels() {
            return false;
        }
        self.pixels = convert_pixels(data, format, self.format);
        self.dirty = true;
        true
    }

    pub fn submit(&mut self) {
        self.dirty = false;
        self.submissions += 1;
    }
}

/// Re-pack pixel data between channel layouts. Single-channel sources are
/// treated as grey; a missing alpha channel becomes opaque.
pub fn convert_pixels(data: &[u8], from: TextureFormat, to: TextureFormat) -> Vec<u8> {
    if from == to {
        return data.to_vec();
    }

    let mut out = Vec::with_capacity(data.len() / from.channels() * to.channels());
    for pixel in data.chunks_exact(from.channels()) {
        let rgba = match from {
            TextureFormat::R8 => [pixel[0], pixel[0], pixel[0], u8::MAX],
            TextureFormat::Rgb8 => [pixel[0], pixel[1], pixel[2], u8::MAX],
            TextureFormat::Rgba8 => [pixel[0], pixel[1], pixel[2], pixel[3]],
        };
        out.extend_from_slice(&rgba[..to.channels()]);
    }
    out
}

/// CPU-side mesh streams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub attributes: HashMap<MeshAttribute, Vec<f32>>,
    pub triangles: Vec<u32>,
}

impl MeshBuffers {
    pub fn attribute(&self, attribute: MeshAttribute) -> &[f32] {
        self.attributes
            .get(&attribute)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty() && self.attributes.values().all(Vec::is_empty)
    }

    /// Smooth per-vertex normals from area-weighted face normals.
    ///
    /// Triangles referencing a vertex that does not exist are skipped.
    pub fn recalculate_normals(&mut self) {
        let positions: Vec<Vec3> = self
            .attribute(MeshAttribute::Vertices)
            .chunks_exact(3)
            .map(Vec3::from_slice)
            .collect();
        let mut normals = vec![Vec3::ZERO; positions.len()];

        for tri in self.triangles.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if a >= positions.len() || b >= positions.len() || c >= positions.len() {
                continue;
            }
            // unnormalised: weighted by twice the triangle area
            let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }

        let flat = normals
            .into_iter()
            .flat_map(|n| n.normalize_or_zero().to_array())
            .collect();
        self.attributes.insert(MeshAttribute::Normals, flat);
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeshState {
    pub cpu: MeshBuffers,
    pub gpu: Option<MeshBuffers>,
}

impl MeshState {
    pub fn with_buffers(cpu: MeshBuffers) -> Self {
        Self { cpu, gpu: None }
    }

    /// Upload CPU streams, optionally dropping the CPU copy afterwards.
    pub fn submit(&mut self, clear_cpu: bool) {
        self.gpu = Some(self.cpu.clone());
        if clear_cpu {
            self.cpu = MeshBuffers::default();
        }
    }

    pub fn copy_to_cpu(&mut self) {
        if let Some(gpu) = &self.gpu {
            self.cpu = gpu.clone();
        }
    }
}

#[derive(Debug, Clone)]
pub struct MaterialState {
    pub name: String,
    pub shader: AssetHandle,
}

#[derive(Debug, Clone)]
pub enum Asset {
    Prefab(PrefabTemplate),
    ComputeShader(ComputeShaderState),
    Texture(TextureState),
    Mesh(MeshState),
    Material(MaterialState),
}

/// Typed accessors generated per asset variant.
macro_rules! asset_accessors {
    ($($get:ident, $get_mut:ident => $variant:ident($ty:ty)),+ $(,)?) => {
        $(
            pub fn $get(&self, handle: AssetHandle) -> Option<&$ty> {
                match self.assets.get(&handle) {
                    Some(Asset::$variant(inner)) => Some(inner),
                    _ => None,
                }
            }

            pub fn $get_mut(&mut self, handle: AssetHandle) -> Option<&mut $ty> {
                match self.assets.get_mut(&handle) {
                    Some(Asset::$variant(inner)) => Some(inner),
                    _ => None,
                }
            }
        )+
    };
}

pub struct AssetTable {
    assets: HashMap<AssetHandle, Asset>,
    next_handle: u32,
    limit: usize,
}

impl AssetTable {
    pub fn new(limit: usize) -> Self {
        Self {
            assets: HashMap::new(),
            next_handle: 1,
            limit,
        }
    }

    /// Store `asset`, or return null when the table is full.
    pub fn insert(&mut self, asset: Asset) -> AssetHandle {
        if self.assets.len() >= self.limit || self.next_handle == u32::MAX {
            return AssetHandle::NULL;
        }
        let handle = AssetHandle::new(self.next_handle);
        self.next_handle += 1;
        self.assets.insert(handle, asset);
        handle
    }

    pub fn remove(&mut self, handle: AssetHandle) -> Option<Asset> {
        self.assets.remove(&handle)
    }

    pub fn contains(&self, handle: AssetHandle) -> bool {
        self.assets.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    asset_accessors!(
        prefab, prefab_mut => Prefab(PrefabTemplate),
        compute_shader, compute_shader_mut => ComputeShader(ComputeShaderState),
        texture, texture_mut => Texture(TextureState),
        mesh, mesh_mut => Mesh(MeshState),
        material, material_mut => Material(MaterialState),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshBuffers {
        let mut mesh = MeshBuffers::default();
        mesh.attributes.insert(
            MeshAttribute::Vertices,
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 0.0, -1.0, //
                0.0, 0.0, -1.0,
            ],
        );
        mesh.triangles = vec![0, 1, 2, 0, 2, 3];
        mesh
    }

    #[test]
    fn flat_quad_normals_point_up() {
        let mut mesh = quad();
        mesh.recalculate_normals();
        let normals = mesh.attribute(MeshAttribute::Normals);
        assert_eq!(normals.len(), 12);
        for n in normals.chunks_exact(3) {
            assert!(Vec3::from_slice(n).abs_diff_eq(Vec3::Y, 1e-6), "{n:?}");
        }
    }

    #[test]
    fn bad_indices_are_skipped() {
        let mut mesh = quad();
        mesh.triangles.extend_from_slice(&[0, 1, 99]);
        mesh.recalculate_normals();
        assert_eq!(mesh.attribute(MeshAttribute::Normals).len(), 12);
    }

    #[test]
    fn submit_can_drop_the_cpu_copy() {
        let mut state = MeshState::with_buffers(quad());
        state.submit(true);
        assert!(state.cpu.is_empty());
        state.copy_to_cpu();
        assert_eq!(state.cpu, quad());
    }

    #[test]
    fn table_is_bounded_and_never_reuses_handles() {
        let mut table = AssetTable::new(1);
        let material = MaterialState {
            name: "a".into(),
            shader: AssetHandle::NULL,
        };
        let first = table.insert(Asset::Material(material.clone()));
        assert_eq!(first, AssetHandle::new(1));
        assert!(table.insert(Asset::Material(material.clone())).is_null());

        table.remove(first);
        let second = table.insert(Asset::Material(material));
        assert_eq!(second, AssetHandle::new(2));
        assert!(table.material(second).is_some());
        assert!(table.texture(second).is_none());
    }

    #[test]
    fn pixels_convert_between_layouts() {
        assert_eq!(
            convert_pixels(&[10, 20], TextureFormat::R8, TextureFormat::Rgba8),
            vec![10, 10, 10, 255, 20, 20, 20, 255]
        );
        assert_eq!(
            convert_pixels(&[1, 2, 3, 4], TextureFormat::Rgba8, TextureFormat::R8),
            vec![1]
        );
    }

    #[test]
    fn set_pixel_writes_the_right_slot() {
        let mut texture = TextureState::new(2, 2, TextureFormat::Rgb8);
        assert!(texture.set_pixel(Vec4::new(1.0, 0.0, 0.5, 1.0), IVec2::new(1, 1)));
        assert_eq!(&texture.pixels[9..12], &[255, 0, 128]);
        assert!(!texture.set_pixel(Vec4::ONE, IVec2::new(2, 0)));
        assert!(!texture.set_pixel(Vec4::ONE, IVec2::new(-1, 0)));
    }
}
