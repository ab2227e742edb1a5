mod profile_dto;

pub use profile_dto::{
    get_avatar_extension, ConfirmTokenDto, EmailChangeRequestDto, PasswordChangeRequestDto,
    PasswordResetConfirmDto, PasswordResetRequestDto, UpdateProfileDto, UserResponseDto,
};
