//! Contains the data shapes that are exchanged with the external catalog and
//! persistence services of the deployment console.

pub mod catalog;
pub mod deployment;

pub use {
    catalog::{Artifact, Catalog, DeploymentDescriptor, Network, Template, TemplateField},
    deployment::{DeploymentRecord, Status, StoredDeployment},
};
