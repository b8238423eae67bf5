//! Procedural rolling terrain rebuilt from a height function every frame

use conduit_core::Result;
use conduit_script::{Behaviour, Entity, Mesh, MeshFilter, MeshRenderer};
use glam::Vec3;

pub struct GenerateMesh {
    pub size_x: u32,
    pub size_z: u32,
    pub amplitude: f32,
    pub frequency: f32,
    mesh: Option<Mesh>,
}

impl Default for GenerateMesh {
    fn default() -> Self {
        Self {
            size_x: 32,
            size_z: 32,
            amplitude: 1.5,
            frequency: 0.35,
            mesh: None,
        }
    }
}

impl GenerateMesh {
    fn height(&self, x: f32, z: f32, time: f32) -> f32 {
        let f = self.frequency;
        self.amplitude * ((x * f + time).sin() * (z * f * 0.7 - time * 0.5).cos())
    }

    fn vertices(&self, time: f32) -> Vec<Vec3> {
        let half_x = self.size_x as f32 * 0.5;
        let half_z = self.size_z as f32 * 0.5;
        let mut vertices = Vec::with_capacity(((self.size_x + 1) * (self.size_z + 1)) as usize);
        for z in 0..=self.size_z {
            for x in 0..=self.size_x {
                let (px, pz) = (x as f32 - half_x, z as f32 - half_z);
                vertices.push(Vec3::new(px, self.height(px, pz, time), pz));
            }
        }
        vertices
    }

    fn triangles(&self) -> Vec<u32> {
        let row = self.size_x + 1;
        let mut triangles = Vec::with_capacity((self.size_x * self.size_z * 6) as usize);
        for z in 0..self.size_z {
            for x in 0..self.size_x {
                let i = z * row + x;
                triangles.extend_from_slice(&[i, i + row, i + 1, i + 1, i + row, i + row + 1]);
            }
        }
        triangles
    }
}

impl Behaviour for GenerateMesh {
    fn on_start(&mut self, entity: &Entity) -> Result<()> {
        entity.add::<MeshRenderer>();
        let filter = entity.add::<MeshFilter>();

        let mesh = Mesh::new(entity.context())?;
        mesh.set_vertices(&self.vertices(0.0))?;
        mesh.set_triangles(&self.triangles())?;
        mesh.recalculate_normals()?;
        mesh.submit_changes(false)?;
        filter.set_mesh(&mesh)?;

        entity
            .context()
            .debug()
            .info(&format!("terrain mesh with {} triangles", self.size_x * self.size_z * 2));
        self.mesh = Some(mesh);
        Ok(())
    }

    fn on_update(&mut self, entity: &Entity) -> Result<()> {
        let time = entity.context().time().current_time();
        if let Some(mesh) = &self.mesh {
            mesh.set_vertices(&self.vertices(time))?;
            mesh.recalculate_normals()?;
            mesh.submit_changes(false)?;
        }
        Ok(())
    }

    fn on_destroy(&mut self, _entity: &Entity) -> Result<()> {
        if let Some(mut mesh) = self.mesh.take() {
            mesh.release();
        }
        Ok(())
    }
}
