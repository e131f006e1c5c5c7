use clap::Parser;
use log::{info, warn};
use nalgebra::Matrix4;

use point_cloud_registration::{
    filters::{remove_non_finite, voxel_downsample},
    io::{read_ply, read_transform, write_ply, write_transform},
    pointcloud::PointCloud,
    PointCloudRegistration, RegistrationParams,
};

#[derive(Parser)]
#[command(about = "Robust rigid registration of two point clouds")]
struct Args {
    /// PLY file with the cloud to be moved
    source: String,
    /// PLY file with the reference cloud
    target: String,
    /// JSON file with the registration parameters
    #[clap(long)]
    params: Option<String>,
    /// Neighborhood search radius
    #[clap(long)]
    radius: Option<f64>,
    /// Maximum number of correspondences per source point
    #[clap(long)]
    max_neighbours: Option<usize>,
    /// Number of iterations
    #[clap(long)]
    n_iter: Option<usize>,
    /// Degrees of freedom of the t-distribution
    #[clap(long, conflicts_with = "use_gaussian")]
    dof: Option<f64>,
    /// Uses the Gaussian noise model instead of the t-distribution
    #[clap(long, action)]
    use_gaussian: bool,
    /// Prints the solver reports
    #[clap(long, short, action)]
    verbose: bool,
    /// Number of worker threads
    #[clap(long)]
    threads: Option<usize>,
    /// Voxel size for downsampling the source before registration, 0 disables
    #[clap(long)]
    source_voxel: Option<f64>,
    /// Voxel size for downsampling the target before registration, 0 disables
    #[clap(long)]
    target_voxel: Option<f64>,
    /// JSON file with an initial guess of the transform
    #[clap(long)]
    initial: Option<String>,
    /// Writes the aligned source cloud to this PLY file
    #[clap(long, short)]
    output: Option<String>,
    /// Writes the estimated transform to this JSON file
    #[clap(long)]
    transform_output: Option<String>,
}

impl Args {
    fn registration_params(
        &self,
    ) -> Result<RegistrationParams, point_cloud_registration::error::Error> {
        let mut params = match &self.params {
            Some(path) => RegistrationParams::from_json_file(path)?,
            None => RegistrationParams::default(),
        };

        if let Some(radius) = self.radius {
            params.radius(radius);
        }
        if let Some(max_neighbours) = self.max_neighbours {
            params.max_neighbours(max_neighbours);
        }
        if let Some(n_iter) = self.n_iter {
            params.n_iter(n_iter);
        }
        if let Some(dof) = self.dof {
            params.dof(dof);
        }
        if self.use_gaussian {
            params.use_gaussian();
        }
        if self.verbose {
            params.verbose(true);
        }
        if self.threads.is_some() {
            params.num_threads = self.threads;
        }
        Ok(params)
    }
}

fn load_cloud(path: &str) -> Result<PointCloud, point_cloud_registration::error::Error> {
    let (cloud, removed) = remove_non_finite(&read_ply(path)?);
    if removed > 0 {
        warn!("Removed {removed} non finite points from {path}");
    }
    Ok(cloud)
}

fn downsample(
    name: &str,
    cloud: &PointCloud,
    voxel_size: Option<f64>,
) -> Result<PointCloud, point_cloud_registration::error::Error> {
    match voxel_size {
        Some(size) if size != 0.0 => {
            let downsampled = voxel_downsample(cloud, size)?;
            info!(
                "Downsampled {name} from {} to {} points",
                cloud.len(),
                downsampled.len()
            );
            Ok(downsampled)
        }
        _ => Ok(cloud.clone()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let params = args.registration_params()?;

    let source = load_cloud(&args.source)?;
    let sampled_source = downsample("source", &source, args.source_voxel)?;
    let target = downsample("target", &load_cloud(&args.target)?, args.target_voxel)?;
    info!(
        "Registering {} source points onto {} target points",
        sampled_source.len(),
        target.len()
    );

    let mut registration = PointCloudRegistration::new(&sampled_source, &target, params)?;
    if let Some(path) = &args.initial {
        registration = registration.with_initial_transform(read_transform(path)?);
    }
    registration.align();

    let transform = registration.transformation().clone();
    let translation = transform.translation();
    let rotation = transform.rotation();
    info!(
        "Translation: [{:.6}, {:.6}, {:.6}]",
        translation[0], translation[1], translation[2]
    );
    info!(
        "Rotation (w, x, y, z): [{:.6}, {:.6}, {:.6}, {:.6}]",
        rotation.w, rotation.i, rotation.j, rotation.k
    );
    info!("Matrix:{}", Matrix4::from(transform.clone()));

    if let Some(path) = &args.output {
        write_ply(path, &(&transform * &source))?;
        info!("Aligned source written to {path}");
    }
    if let Some(path) = &args.transform_output {
        write_transform(path, &transform)?;
        info!("Transform written to {path}");
    }

    Ok(())
}
