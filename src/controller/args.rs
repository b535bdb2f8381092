//! Argument tuples accepted by the controller.

use std::any::Any;
use std::fmt::Debug;

/// Positional arguments of a mocked call.
///
/// Implemented for tuples of up to nine elements; that bound is the arity cap of the hooks the
/// controller can drive.
pub trait Args: PartialEq + Debug + Send + Sync + 'static {
    /// Number of positional arguments.
    const ARITY: usize;

    /// Arguments as type-erased references, in order.
    fn as_any_list(&self) -> Vec<&dyn Any>;
}

macro_rules! impl_args {
    ($arity:expr $(, $name:ident $idx:tt)*) => {
        impl<$($name),*> Args for ($($name,)*)
        where
            $($name: PartialEq + Debug + Send + Sync + 'static,)*
        {
            const ARITY: usize = $arity;

            fn as_any_list(&self) -> Vec<&dyn Any> {
                vec![$(&self.$idx as &dyn Any),*]
            }
        }
    };
}

impl_args!(0);
impl_args!(1, A 0);
impl_args!(2, A 0, B 1);
impl_args!(3, A 0, B 1, C 2);
impl_args!(4, A 0, B 1, C 2, D 3);
impl_args!(5, A 0, B 1, C 2, D 3, E 4);
impl_args!(6, A 0, B 1, C 2, D 3, E 4, F 5);
impl_args!(7, A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_args!(8, A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
impl_args!(9, A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
