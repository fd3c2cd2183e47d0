fn main() {
    medichat_lib::run();
}
