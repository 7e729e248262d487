use std::marker::PhantomData;

/// Trait representing optional callbacks
pub trait Callback {
    type Argument;
    fn call(&mut self, arg: Self::Argument);
}

/// Trait representing optional abort callbacks.
/// Checked between reads while downloading; returning true stops the transfer and leaves the
/// partial file in place so the next call can resume it.
pub trait AbortCallback {
    fn abort(&mut self) -> bool;
}

/// Encapsulates a basic FnMut(T) callback for functions that accept optional callbacks.
pub struct RecipeCallback<T, CB: FnMut(T)> {
    callback: CB,
    _marker: PhantomData<T>,
}

impl<T, CB: FnMut(T)> RecipeCallback<T, CB> {
    pub fn new(callback: CB) -> Self {
        Self {
            callback,
            _marker: PhantomData,
        }
    }
}

impl<T, CB: FnMut(T)> Callback for RecipeCallback<T, CB> {
    type Argument = T;
    fn call(&mut self, arg: T) {
        (self.callback)(arg);
    }
}

/// Encapsulates an abort callback. Return true in the closure to indicate "should abort"
pub struct RecipeAbortCallback<B>
where
    B: FnMut() -> bool,
{
    abort_callback: B,
}

impl<B> RecipeAbortCallback<B>
where
    B: FnMut() -> bool,
{
    pub fn new(abort_callback: B) -> Self {
        Self { abort_callback }
    }
}

impl<B> AbortCallback for RecipeAbortCallback<B>
where
    B: FnMut() -> bool,
{
    fn abort(&mut self) -> bool {
        (self.abort_callback)()
    }
}

/// To indicate "None" in functions that expect a callback (eg. downloading).
/// This gets called on every read but expect it to be optimized out.
pub struct Nop<T> {
    _marker: PhantomData<T>,
}

impl<T> Nop<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Nop<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Callback for Nop<T> {
    type Argument = T;
    fn call(&mut self, _arg: T) {}
}

impl AbortCallback for Nop<()> {
    fn abort(&mut self) -> bool {
        false
    }
}
