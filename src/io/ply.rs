use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;
use ply_rs::{parser, ply};

use crate::error::Error;
use crate::pointcloud::PointCloud;

/// Vertex position, other vertex properties are ignored.
struct Vertex {
    point: [f64; 3],
}

impl ply::PropertyAccess for Vertex {
    fn new() -> Self {
        Vertex { point: [0f64; 3] }
    }

    fn set_property(&mut self, key: String, property: ply::Property) {
        let coord = match key.as_ref() {
            "x" => 0,
            "y" => 1,
            "z" => 2,
            _ => return,
        };
        match property {
            ply::Property::Float(v) => self.point[coord] = v as f64,
            ply::Property::Double(v) => self.point[coord] = v,
            _ => (),
        }
    }
}

/// Reads the vertices of a PLY file as a point cloud.
///
/// Elements other than `vertex` (faces, for example) are skipped.
pub fn read_ply<P>(filepath: P) -> Result<PointCloud, Error>
where
    P: AsRef<Path>,
{
    let mut f = BufReader::new(File::open(filepath)?);

    let header = parser::Parser::<DefaultElement>::new().read_header(&mut f)?;

    let mut vertices = None;
    for (_ignore_key, element) in &header.elements {
        if element.name == "vertex" {
            if !["x", "y", "z"]
                .iter()
                .all(|k| element.properties.contains_key(*k))
            {
                return Err(Error::parser("Vertex element without x, y and z properties"));
            }

            vertices = Some(
                parser::Parser::<Vertex>::new().read_payload_for_element(
                    &mut f, element, &header,
                )?,
            );
        } else {
            parser::Parser::<DefaultElement>::new()
                .read_payload_for_element(&mut f, element, &header)?;
        }
    }

    let vertices = vertices.ok_or_else(|| Error::parser("PLY file has no vertex element"))?;
    Ok(PointCloud {
        points: ndarray::Array2::from_shape_fn((vertices.len(), 3), |(i, c)| {
            vertices[i].point[c]
        }),
    })
}

/// Writes a point cloud as an ASCII PLY file with double precision vertices.
pub fn write_ply<P>(filepath: P, pcl: &PointCloud) -> Result<(), Error>
where
    P: AsRef<Path>,
{
    let mut ply = Ply::<DefaultElement>::new();
    let mut vertex_element = ElementDef::new("vertex".to_string());
    ["x", "y", "z"].iter().for_each(|key| {
        vertex_element.properties.add(PropertyDef::new(
            key.to_string(),
            PropertyType::Scalar(ScalarType::Double),
        ));
    });

    let vertex_array: Vec<DefaultElement> = pcl
        .iter()
        .map(|point| {
            let mut elem = DefaultElement::new();
            elem.insert("x".to_string(), Property::Double(point[0]));
            elem.insert("y".to_string(), Property::Double(point[1]));
            elem.insert("z".to_string(), Property::Double(point[2]));
            elem
        })
        .collect();

    ply.header.elements.add(vertex_element);
    ply.payload.insert("vertex".to_string(), vertex_array);
    ply.make_consistent()
        .map_err(|err| Error::parser(format!("{err:?}")))?;
    ply.header.encoding = Encoding::Ascii;

    let mut buf = BufWriter::new(File::create(filepath)?);
    Writer::new().write_ply(&mut buf, &mut ply)?;

    Ok(())
}
