use resolver::ModuleSet;
use spec::{Dep, Deployment};

mod custom;
mod rwa;

pub use custom::CustomDeployment;
pub use rwa::RwaDeployment;

pub const MODULES: [&str; 2] = ["rwa", "custom"];

pub fn apply(dep: &Dep) -> eyre::Result<ModuleSet> {
    let modules = match dep.module.as_str() {
        "rwa" => RwaDeployment::default().apply(dep)?,
        "custom" => CustomDeployment::default().apply(dep)?,
        _ => {
            return Err(eyre::eyre!(
                "Unknown module: {}. Supported modules: {}",
                dep.module,
                MODULES.join(", ")
            ));
        }
    };

    Ok(ModuleSet::try_from(modules)?)
}
