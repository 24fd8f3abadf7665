// src/services/optimistic.rs
//
// Atualização otimista explícita: o snapshot é capturado antes de aplicar,
// e a transição termina em `Committed` ou `RolledBack`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Committed,
    RolledBack,
}

#[derive(Debug)]
pub struct OptimisticUpdate<T: Clone> {
    snapshot: T,
    state: MutationState,
}

impl<T: Clone> OptimisticUpdate<T> {
    /// Captura o snapshot de `target` e aplica a mudança imediatamente.
    pub fn begin(target: &mut T, apply: impl FnOnce(&mut T)) -> Self {
        let snapshot = target.clone();
        apply(target);
        Self {
            snapshot,
            state: MutationState::Pending,
        }
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn snapshot(&self) -> &T {
        &self.snapshot
    }

    pub fn commit(mut self) -> MutationState {
        self.state = MutationState::Committed;
        self.state
    }

    /// Restaura `target` para o valor anterior à mutação.
    pub fn rollback(mut self, target: &mut T) -> MutationState {
        *target = self.snapshot.clone();
        self.state = MutationState::RolledBack;
        self.state
    }
}
