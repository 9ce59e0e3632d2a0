//! In-memory `OntologyStore` used by the gateway tests.
//!
//! Mirrors the store contract: strict creation, idempotent assignment
//! edges, atomic node-plus-edge writes. A mutation counter records every
//! write attempt that reaches the store, so tests can prove that rejected
//! requests never got this far.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use prodgraph_core::requests::ProductPatch;
use prodgraph_core::types::{
    Component, EntityKind, Functionality, Incident, OwnerKind, Product, Resolution,
};
use prodgraph_core::{OntologyError, OntologyStore};

#[derive(Default)]
struct State {
    products: BTreeMap<String, Product>,
    functionalities: BTreeMap<String, Functionality>,
    components: BTreeMap<String, Component>,
    incidents: BTreeMap<String, Incident>,
    resolutions: BTreeMap<String, Resolution>,
    // (owner label, owner code, functionality code)
    assignments: HashSet<(String, String, String)>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    mutations: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write attempts that reached the store, successful or not.
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl OntologyStore for MemoryStore {
    async fn create_product(
        &self,
        product: &Product,
        functionalities: &[String],
    ) -> Result<(), OntologyError> {
        self.touch();
        let mut state = self.state.lock().unwrap();

        if state.products.contains_key(&product.code) {
            return Err(OntologyError::duplicate(EntityKind::Product, &product.code));
        }
        for code in functionalities {
            if !state.functionalities.contains_key(code) {
                return Err(OntologyError::not_found(EntityKind::Functionality, code));
            }
        }

        state.products.insert(product.code.clone(), product.clone());
        for code in functionalities {
            state.assignments.insert((
                "Product".to_string(),
                product.code.clone(),
                code.clone(),
            ));
        }
        Ok(())
    }

    async fn get_product(&self, code: &str) -> Result<Option<Product>, OntologyError> {
        Ok(self.state.lock().unwrap().products.get(code).cloned())
    }

    async fn update_product(
        &self,
        code: &str,
        patch: &ProductPatch,
    ) -> Result<Product, OntologyError> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        let product = state
            .products
            .get_mut(code)
            .ok_or_else(|| OntologyError::not_found(EntityKind::Product, code))?;
        if let Some(name) = &patch.name {
            product.name = name.clone();
            product.updated_at = Some(chrono::Utc::now());
        }
        Ok(product.clone())
    }

    async fn delete_product(&self, code: &str) -> Result<(), OntologyError> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        if state.products.remove(code).is_none() {
            return Err(OntologyError::not_found(EntityKind::Product, code));
        }
        state
            .assignments
            .retain(|(label, owner, _)| !(label == "Product" && owner == code));
        Ok(())
    }

    async fn list_products(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Product>, u64), OntologyError> {
        let state = self.state.lock().unwrap();
        let total = state.products.len() as u64;
        let items = state
            .products
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn search_products(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Product>, OntologyError> {
        let needle = query.to_lowercase();
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .values()
            .filter(|p| {
                p.code.to_lowercase().contains(&needle) || p.name.to_lowercase().contains(&needle)
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create_functionality(
        &self,
        functionality: &Functionality,
    ) -> Result<(), OntologyError> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        if state.functionalities.contains_key(&functionality.code) {
            return Err(OntologyError::duplicate(
                EntityKind::Functionality,
                &functionality.code,
            ));
        }
        state
            .functionalities
            .insert(functionality.code.clone(), functionality.clone());
        Ok(())
    }

    async fn get_functionality(
        &self,
        code: &str,
    ) -> Result<Option<Functionality>, OntologyError> {
        Ok(self.state.lock().unwrap().functionalities.get(code).cloned())
    }

    async fn list_functionalities(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Functionality>, u64), OntologyError> {
        let state = self.state.lock().unwrap();
        let total = state.functionalities.len() as u64;
        let items = state
            .functionalities
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn create_component(&self, component: &Component) -> Result<(), OntologyError> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        if state.components.contains_key(&component.code) {
            return Err(OntologyError::duplicate(
                EntityKind::Component,
                &component.code,
            ));
        }
        state
            .components
            .insert(component.code.clone(), component.clone());
        Ok(())
    }

    async fn get_component(&self, code: &str) -> Result<Option<Component>, OntologyError> {
        Ok(self.state.lock().unwrap().components.get(code).cloned())
    }

    async fn assign_functionalities(
        &self,
        owner: OwnerKind,
        owner_code: &str,
        codes: &[String],
    ) -> Result<(), OntologyError> {
        self.touch();
        let mut state = self.state.lock().unwrap();

        let owner_exists = match owner {
            OwnerKind::Product => state.products.contains_key(owner_code),
            OwnerKind::Component => state.components.contains_key(owner_code),
        };
        if !owner_exists {
            return Err(OntologyError::not_found(owner.entity(), owner_code));
        }
        for code in codes {
            if !state.functionalities.contains_key(code) {
                return Err(OntologyError::not_found(EntityKind::Functionality, code));
            }
        }

        for code in codes {
            state.assignments.insert((
                owner.label().to_string(),
                owner_code.to_string(),
                code.clone(),
            ));
        }
        Ok(())
    }

    async fn remove_assignments(
        &self,
        owner: OwnerKind,
        owner_code: &str,
        codes: &[String],
    ) -> Result<u64, OntologyError> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        let mut removed = 0;
        for code in codes {
            let key = (
                owner.label().to_string(),
                owner_code.to_string(),
                code.clone(),
            );
            if state.assignments.remove(&key) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn functionalities_of(
        &self,
        owner: OwnerKind,
        owner_code: &str,
    ) -> Result<Vec<Functionality>, OntologyError> {
        let state = self.state.lock().unwrap();
        let mut codes: Vec<&String> = state
            .assignments
            .iter()
            .filter(|(label, code, _)| label == owner.label() && code == owner_code)
            .map(|(_, _, func)| func)
            .collect();
        codes.sort();
        Ok(codes
            .into_iter()
            .filter_map(|c| state.functionalities.get(c).cloned())
            .collect())
    }

    async fn products_with_functionality(
        &self,
        code: &str,
    ) -> Result<Vec<Product>, OntologyError> {
        let state = self.state.lock().unwrap();
        let mut owners: Vec<&String> = state
            .assignments
            .iter()
            .filter(|(label, _, func)| label == "Product" && func == code)
            .map(|(_, owner, _)| owner)
            .collect();
        owners.sort();
        Ok(owners
            .into_iter()
            .filter_map(|c| state.products.get(c).cloned())
            .collect())
    }

    async fn create_incident(&self, incident: &Incident) -> Result<(), OntologyError> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        if !state
            .functionalities
            .contains_key(&incident.functionality_code)
        {
            return Err(OntologyError::not_found(
                EntityKind::Functionality,
                &incident.functionality_code,
            ));
        }
        if state.incidents.contains_key(&incident.code) {
            return Err(OntologyError::duplicate(EntityKind::Incident, &incident.code));
        }
        state.incidents.insert(incident.code.clone(), incident.clone());
        Ok(())
    }

    async fn get_incident(&self, code: &str) -> Result<Option<Incident>, OntologyError> {
        Ok(self.state.lock().unwrap().incidents.get(code).cloned())
    }

    async fn incidents_by_functionality(
        &self,
        code: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Incident>, u64), OntologyError> {
        let state = self.state.lock().unwrap();
        let mut all: Vec<Incident> = state
            .incidents
            .values()
            .filter(|i| i.functionality_code == code)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn incidents_by_product(
        &self,
        code: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Incident>, u64), OntologyError> {
        let state = self.state.lock().unwrap();
        let assigned: HashSet<&String> = state
            .assignments
            .iter()
            .filter(|(label, owner, _)| label == "Product" && owner == code)
            .map(|(_, _, func)| func)
            .collect();
        let mut all: Vec<Incident> = state
            .incidents
            .values()
            .filter(|i| assigned.contains(&i.functionality_code))
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn create_resolution(&self, resolution: &Resolution) -> Result<(), OntologyError> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        if !state.incidents.contains_key(&resolution.incident_code) {
            return Err(OntologyError::not_found(
                EntityKind::Incident,
                &resolution.incident_code,
            ));
        }
        if state.resolutions.contains_key(&resolution.incident_code) {
            return Err(OntologyError::duplicate(
                EntityKind::Resolution,
                &resolution.incident_code,
            ));
        }
        state
            .resolutions
            .insert(resolution.incident_code.clone(), resolution.clone());
        Ok(())
    }

    async fn resolutions_of(
        &self,
        incident_code: &str,
    ) -> Result<Vec<Resolution>, OntologyError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .resolutions
            .get(incident_code)
            .cloned()
            .into_iter()
            .collect())
    }
}
